//! # Pivot rules
//!
//! Strategies for moving from basis to basis.
use enum_map::{EnumMap, enum_map};
use num_traits::Float;

use crate::algorithm::simplex::tableau::{LabelType, Pivot, Tableau};
use crate::error::{Error, Result};

/// Deciding how to pivot.
///
/// During the Simplex method, one needs to decide how to move from basic solution to basic
/// solution. The pivot rule describes that behavior.
///
/// Once the column has been selected, a row needs to be found. That decision is shared by all
/// rules: the ratio test with a smallest subscript tie-break.
pub trait PivotRule<F> {
    /// Column selection rule for the primal Simplex method.
    ///
    /// # Return value
    ///
    /// The index of a column with a negative relative cost, or `None` if the tableau is optimal.
    fn pricing(&self, tableau: &Tableau<F>) -> Option<usize>;

    /// Tolerance used for all comparisons made by this rule.
    fn epsilon(&self) -> F;

    /// Determine the row to pivot on.
    ///
    /// Among the rows with a negative entry in `column`, this is the row with the smallest ratio
    /// `-B_i / T[i][column]`. Ratios are compared relative to their magnitude. When several rows
    /// attain the minimum, the one whose variable has the smallest subscript leaves, which is
    /// Bland's anti cycling device.
    ///
    /// # Arguments
    ///
    /// * `tableau`: Tableau in a primal feasible state.
    /// * `column`: Entering column, in range `0` until `tableau.nr_columns()`.
    ///
    /// # Return value
    ///
    /// Index of the row to pivot on. If not found, the column can be increased without bound.
    fn ratio_test(&self, tableau: &Tableau<F>, column: usize) -> Option<usize>
    where
        F: Float,
    {
        debug_assert!(column < tableau.nr_columns());
        let epsilon = self.epsilon();

        // (chosen row, minimum ratio)
        let mut min_values: Option<(usize, F)> = None;
        for row in 0..tableau.nr_rows() {
            let entry = tableau.entry(row, column);
            if entry >= -epsilon {
                continue;
            }

            let ratio = -tableau.rhs(row) / entry;
            if let Some((min_row, min_ratio)) = &mut min_values {
                if ratios_tie(ratio, *min_ratio, epsilon) {
                    if tableau.row_label(row).index < tableau.row_label(*min_row).index {
                        *min_row = row;
                    }
                    *min_ratio = F::min(*min_ratio, ratio);
                } else if ratio < *min_ratio {
                    *min_row = row;
                    *min_ratio = ratio;
                }
            } else {
                min_values = Some((row, ratio));
            }
        }

        min_values.map(|(row, _)| row)
    }

    /// Select both the entering column and the leaving row.
    ///
    /// # Return value
    ///
    /// The pivot, or `None` if the tableau is optimal.
    ///
    /// # Errors
    ///
    /// `Error::Unbounded` when an improving column exists but no row limits it.
    fn select_pivot(&self, tableau: &Tableau<F>) -> Result<Option<Pivot>>
    where
        F: Float,
    {
        match self.pricing(tableau) {
            Some(column) => match self.ratio_test(tableau, column) {
                Some(row) => Ok(Some(Pivot { row, column })),
                None => Err(Error::Unbounded { column }),
            },
            None => Ok(None),
        }
    }
}

/// Whether two ratios are equal up to a tolerance that scales with their magnitude.
fn ratios_tie<F: Float>(first: F, second: F, epsilon: F) -> bool {
    let scale = F::one().max(first.abs()).max(second.abs());
    (first - second).abs() <= epsilon * scale
}

/// Kinds of column variables that may enter the basis.
///
/// Artificial variables that have left the basis are not brought back.
fn entering_kinds() -> EnumMap<LabelType, bool> {
    enum_map! {
        LabelType::Basic | LabelType::NonBasic | LabelType::Free => true,
        LabelType::Artificial => false,
    }
}

/// Simply pivot on the column, which has the most negative relative cost.
///
/// Ties are broken by taking the first such column. There is no guarantee against cycling.
pub struct SteepestDescentAlongVariable<F> {
    epsilon: F,
    entering: EnumMap<LabelType, bool>,
}

impl<F> SteepestDescentAlongVariable<F> {
    /// Create a new instance.
    pub fn new(epsilon: F) -> Self {
        Self { epsilon, entering: entering_kinds() }
    }
}

impl<F: Float> PivotRule<F> for SteepestDescentAlongVariable<F> {
    fn pricing(&self, tableau: &Tableau<F>) -> Option<usize> {
        let mut smallest: Option<(usize, F)> = None;
        for (j, cost) in (0..tableau.nr_columns())
            .filter(|&j| self.entering[tableau.column_label(j).kind])
            .map(|j| (j, tableau.relative_cost(j)))
            .filter(|&(_, cost)| cost < -self.epsilon) {
            if let Some((existing_j, existing_cost)) = smallest.as_mut() {
                if cost < *existing_cost {
                    *existing_j = j;
                    *existing_cost = cost;
                }
            } else { smallest = Some((j, cost)) }
        }

        smallest.map(|(j, _)| j)
    }

    fn epsilon(&self) -> F {
        self.epsilon
    }
}

/// Bland's rule: pivot on the profitable column whose variable has the smallest subscript.
///
/// Together with the smallest subscript tie-break of the ratio test, this prevents cycling.
pub struct SmallestSubscript<F> {
    epsilon: F,
    entering: EnumMap<LabelType, bool>,
}

impl<F> SmallestSubscript<F> {
    /// Create a new instance.
    pub fn new(epsilon: F) -> Self {
        Self { epsilon, entering: entering_kinds() }
    }
}

impl<F: Float> PivotRule<F> for SmallestSubscript<F> {
    fn pricing(&self, tableau: &Tableau<F>) -> Option<usize> {
        (0..tableau.nr_columns())
            .filter(|&j| self.entering[tableau.column_label(j).kind])
            .filter(|&j| tableau.relative_cost(j) < -self.epsilon)
            .min_by_key(|&j| tableau.column_label(j).index)
    }

    fn epsilon(&self) -> F {
        self.epsilon
    }
}
