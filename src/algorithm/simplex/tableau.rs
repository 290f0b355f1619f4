//! # Data structures for Simplex
//!
//! Contains the simplex tableau and the elementary operation which can be performed upon it.
//!
//! The tableau is stored in dictionary form: each constraint row expresses the variable labelling
//! that row in terms of the variables labelling the columns,
//!
//! ```text
//! row_variable_i = B_i + sum_j T[i][j] * column_variable_j
//! z              = B_z + sum_j c_j     * column_variable_j
//! ```
//!
//! with all column variables at zero. A basis is primal feasible when every `B_i` is nonnegative,
//! and increasing column variable `s` is only limited by the rows in which `T[i][s]` is negative.
use std::cmp::max;
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FormatResult};

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use num_traits::Float;

/// The role a variable had when the tableau was created.
///
/// The kind stays with the variable while it moves between the rows and the columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum)]
pub enum LabelType {
    /// Variable that started out in the basis, such as a constraint slack.
    Basic,
    /// Variable that started out at zero outside of the basis.
    NonBasic,
    /// Variable only introduced to find a first feasible basis.
    Artificial,
    /// Variable without a sign restriction.
    Free,
}

/// Name of the variable belonging to a row or column of the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label {
    /// Role of the variable.
    pub kind: LabelType,
    /// Original subscript of the variable, unique within a tableau.
    ///
    /// Smallest subscript rules compare these values, not row or column positions.
    pub index: usize,
}

impl Label {
    /// Create a new label.
    pub fn new(kind: LabelType, index: usize) -> Self {
        Self { kind, index }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        let prefix = match self.kind {
            LabelType::Basic => "b",
            LabelType::NonBasic => "n",
            LabelType::Artificial => "a",
            LabelType::Free => "f",
        };
        write!(f, "{}{}", prefix, self.index)
    }
}

/// Position of a pivot element: the row of the leaving variable and the column of the entering
/// variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pivot {
    /// Constraint row index, in range `0` until `nr_rows()`.
    pub row: usize,
    /// Variable column index, in range `0` until `nr_columns()`.
    pub column: usize,
}

/// A dense simplex tableau with labelled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau<F> {
    /// Matrix of size (m + 1) x (k + 1).
    ///
    /// The last row is the cost row, the last column is the right-hand side ("B").
    data: Vec<Vec<F>>,
    /// Variables currently in the basis, one per constraint row.
    row_labels: Vec<Label>,
    /// Variables currently at zero, one per column (excluding "B").
    column_labels: Vec<Label>,
}

impl<F: Float> Tableau<F> {
    /// Create a tableau.
    ///
    /// # Arguments
    ///
    /// * `rows`: Constraint rows, each of length `column_labels.len() + 1`, the last value being
    /// the right-hand side.
    /// * `cost`: Cost row of the same length, the last value being the objective value.
    /// * `row_labels`: One label per constraint row.
    /// * `column_labels`: One label per column, excluding the right-hand side.
    ///
    /// All label indices should be unique across rows and columns. Shapes and labels are only
    /// checked in debug builds.
    pub fn new(
        rows: Vec<Vec<F>>,
        cost: Vec<F>,
        row_labels: Vec<Label>,
        column_labels: Vec<Label>,
    ) -> Self {
        debug_assert_eq!(rows.len(), row_labels.len());
        debug_assert!(rows.iter().all(|row| row.len() == column_labels.len() + 1));
        debug_assert_eq!(cost.len(), column_labels.len() + 1);
        debug_assert_eq!(
            row_labels.iter().chain(column_labels.iter()).map(|label| label.index).collect::<HashSet<_>>().len(),
            row_labels.len() + column_labels.len(),
            "Label indices are not unique",
        );

        let mut data = rows;
        data.push(cost);

        Self { data, row_labels, column_labels }
    }

    /// Exchange the variable of a row with the variable of a column.
    ///
    /// The row variable leaves the basis, the column variable enters it. All rows, including the
    /// cost row and the right-hand side, are rewritten in terms of the new set of column variables.
    ///
    /// # Arguments
    ///
    /// * `pivot`: Row and column of the pivot element, which should not be zero.
    pub fn pivot(&mut self, pivot: Pivot) {
        let Pivot { row: r, column: s } = pivot;
        debug_assert!(r < self.nr_rows());
        debug_assert!(s < self.nr_columns());

        let element = self.data[r][s];
        debug_assert!(element != F::zero(), "Pivoting on a zero element at ({}, {})", r, s);

        let pivot_row = self.data[r].iter().enumerate()
            .map(|(j, &value)| if j == s { F::one() / element } else { -value / element })
            .collect::<Vec<_>>();

        for (i, row) in self.data.iter_mut().enumerate() {
            if i == r {
                continue;
            }

            let factor = row[s];
            row[s] = F::zero();
            if factor == F::zero() {
                continue;
            }
            for (value, &pivot_value) in row.iter_mut().zip(pivot_row.iter()) {
                *value = *value + factor * pivot_value;
            }
        }
        self.data[r] = pivot_row;

        std::mem::swap(&mut self.row_labels[r], &mut self.column_labels[s]);
    }

    /// Value of tableau element at constraint row `i` and column `j`.
    pub fn entry(&self, i: usize, j: usize) -> F {
        debug_assert!(i < self.nr_rows());
        debug_assert!(j < self.nr_columns());

        self.data[i][j]
    }

    /// Right-hand side of constraint row `i`: the current value of the row variable.
    pub fn rhs(&self, i: usize) -> F {
        debug_assert!(i < self.nr_rows());

        self.data[i][self.nr_columns()]
    }

    /// Relative (reduced) cost of column `j`.
    pub fn relative_cost(&self, j: usize) -> F {
        debug_assert!(j < self.nr_columns());

        self.data[self.nr_rows()][j]
    }

    /// Get the cost of the current solution.
    ///
    /// # Return value
    ///
    /// The current value of the objective function.
    pub fn objective_function_value(&self) -> F {
        self.data[self.nr_rows()][self.nr_columns()]
    }

    /// Label of the variable in constraint row `i`.
    pub fn row_label(&self, i: usize) -> Label {
        self.row_labels[i]
    }

    /// Label of the variable in column `j`.
    pub fn column_label(&self, j: usize) -> Label {
        self.column_labels[j]
    }

    /// Whether the current basic solution satisfies all sign constraints, up to `epsilon`.
    pub fn is_primal_feasible(&self, epsilon: F) -> bool {
        (0..self.nr_rows()).all(|i| self.rhs(i) >= -epsilon)
    }

    /// Current value of a variable.
    ///
    /// # Arguments
    ///
    /// * `index`: Original subscript of the variable, see `Label::index`.
    ///
    /// # Return value
    ///
    /// The right-hand side of the row if the variable is basic, zero if it labels a column and
    /// `None` if no variable has this subscript.
    pub fn value_of(&self, index: usize) -> Option<F> {
        if let Some(i) = self.row_labels.iter().position(|label| label.index == index) {
            Some(self.rhs(i))
        } else if self.column_labels.iter().any(|label| label.index == index) {
            Some(F::zero())
        } else {
            None
        }
    }

    /// Number of constraint rows, the cost row is not counted.
    pub fn nr_rows(&self) -> usize {
        self.row_labels.len()
    }

    /// Number of variable columns, the right-hand side column is not counted.
    pub fn nr_columns(&self) -> usize {
        self.column_labels.len()
    }
}

impl<F: Float + Display> Display for Tableau<F> {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        writeln!(f, "=== Tableau ===")?;
        let objective = self.objective_function_value().to_string();
        let cost = (0..self.nr_columns())
            .map(|j| self.relative_cost(j).to_string())
            .collect::<Vec<_>>();
        let b = (0..self.nr_rows())
            .map(|i| self.rhs(i).to_string())
            .collect::<Vec<_>>();
        let columns = (0..self.nr_columns())
            .map(|j| (0..self.nr_rows()).map(|i| self.entry(i, j).to_string()).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let row_names = self.row_labels.iter().map(Label::to_string).collect::<Vec<_>>();
        let column_names = self.column_labels.iter().map(Label::to_string).collect::<Vec<_>>();

        let row_counter_width = row_names.iter().map(String::len).chain(Some("cost".len())).max().unwrap_or(0);
        let column_width = columns.iter().enumerate()
            .map(|(j, column)| {
                column.iter().map(String::len)
                    .chain([column_names[j].len(), cost[j].len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect::<Vec<_>>();
        let b_inner_width = max(b.iter().map(String::len).max().unwrap_or(0), objective.len());

        // Column labels
        write!(f, "{0:>width$} |", "", width = row_counter_width)?;
        write!(f, " {0:^width$} |", "B", width = b_inner_width)?;
        for (name, width) in column_names.iter().zip(&column_width) {
            write!(f, " {0:^width$}", name, width = width)?;
        }
        writeln!(f)?;

        let total_width = (row_counter_width + 1) + 1 + (1 + b_inner_width + 1) + 1 +
            column_width.iter().map(|l| 1 + l).sum::<usize>();
        writeln!(f, "{}", "-".repeat(total_width))?;

        // Cost row
        write!(f, "{0:>width$} |", "cost", width = row_counter_width)?;
        write!(f, " {0:^width$} |", objective, width = b_inner_width)?;
        for (value, width) in cost.iter().zip(&column_width) {
            write!(f, " {0:^width$}", value, width = width)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(total_width))?;

        // Row labels and row data
        for i in 0..self.nr_rows() {
            write!(f, "{0:>width$} |", row_names[i], width = row_counter_width)?;
            write!(f, " {0:^width$} |", b[i], width = b_inner_width)?;
            for (column, width) in columns.iter().zip(&column_width) {
                write!(f, " {0:^width$}", column[i], width = width)?;
            }
            writeln!(f)?;
        }
        writeln!(f)?;

        writeln!(f, "=== Label kinds ===")?;
        let mut counts = EnumMap::<LabelType, usize>::default();
        for label in self.row_labels.iter().chain(self.column_labels.iter()) {
            counts[label.kind] += 1;
        }
        writeln!(f, "{}", counts.iter().map(|(kind, count)| format!("{:?}: {}", kind, count)).join(", "))
    }
}
