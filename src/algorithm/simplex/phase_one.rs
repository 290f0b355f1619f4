//! # Phase one
//!
//! Finding a point that satisfies
//!
//! ```text
//! A x >= b
//! Aeq x = beq
//! ```
//!
//! by minimizing a single level variable `t >= 0` that is added to every constraint:
//!
//! ```text
//! minimize    t
//! subject to  A (x+ - x-) + t >= b
//!             (Aeq (x+ - x-) - beq) + t >= 0
//!             -(Aeq (x+ - x-) - beq) + t >= 0
//!             x+, x-, t >= 0
//! ```
//!
//! Setting all structural variables to zero and `t` to the largest violation is feasible for this
//! problem, so only a single pivot is needed to start the Simplex method. The original problem is
//! feasible exactly when the minimal `t` is zero.
use nalgebra::DVector;

use crate::algorithm::simplex::{primal, SimplexOutcome};
use crate::algorithm::simplex::strategy::pivot_rule::{SmallestSubscript, SteepestDescentAlongVariable};
use crate::algorithm::simplex::tableau::{Label, LabelType, Pivot, Tableau};
use crate::config::{PivotRuleKind, SolverConfig};
use crate::data::quadratic_program::LinearConstraints;
use crate::error::{Error, Result};

/// Compute a point satisfying all constraints.
///
/// # Arguments
///
/// * `inequalities`: Constraints `A x >= b`.
/// * `equalities`: Constraints `Aeq x = beq`, if any.
/// * `config`: The pivot rule, tolerance and iteration budget are read from here.
///
/// # Return value
///
/// A point violating no constraint by more than `config.epsilon`, up to rounding.
///
/// # Errors
///
/// `Error::Infeasible` if no such point exists, `Error::PhaseOneIterationLimit` if the pivot
/// budget ran out.
pub fn find_feasible_point(
    inequalities: &LinearConstraints,
    equalities: Option<&LinearConstraints>,
    config: &SolverConfig,
) -> Result<DVector<f64>> {
    let n = inequalities.nr_variables();
    debug_assert!(equalities.is_none_or(|equalities| equalities.nr_variables() == n));

    let mut tableau = artificial_tableau(inequalities, equalities);
    if tableau.nr_rows() == 0 {
        return Ok(DVector::zeros(n));
    }

    if let Some(row) = most_violated_row(&tableau, config.epsilon) {
        tableau.pivot(Pivot { row, column: level_column(n) });
    }

    let max_pivots = config.max_iterations * (tableau.nr_rows() + tableau.nr_columns());
    let (outcome, nr_pivots) = match config.pivot_rule {
        PivotRuleKind::SteepestDescent => {
            primal(&mut tableau, &SteepestDescentAlongVariable::new(config.epsilon), max_pivots)
        },
        PivotRuleKind::SmallestSubscript => {
            primal(&mut tableau, &SmallestSubscript::new(config.epsilon), max_pivots)
        },
    }?;
    if outcome == SimplexOutcome::PivotLimit {
        return Err(Error::PhaseOneIterationLimit { pivots: nr_pivots });
    }

    let slack = tableau.objective_function_value();
    tracing::debug!(pivots = nr_pivots, slack, "phase one finished");
    if slack > config.epsilon {
        return Err(Error::Infeasible { slack });
    }

    let value = |index| tableau.value_of(index).unwrap_or(0f64);
    Ok(DVector::from_fn(n, |j, _| value(j) - value(n + j)))
}

/// Column of the level variable `t`, which comes after the split structural variables.
fn level_column(nr_variables: usize) -> usize {
    2 * nr_variables
}

/// Build the dictionary of the phase one problem, with `t` still outside of the basis.
///
/// Variable subscripts are `0..n` for `x+`, `n..2n` for `x-`, `2n` for `t` and `2n + 1 + i` for
/// the slack of row `i`.
fn artificial_tableau(
    inequalities: &LinearConstraints,
    equalities: Option<&LinearConstraints>,
) -> Tableau<f64> {
    let n = inequalities.nr_variables();

    let row = |coefficients: Vec<f64>, constant: f64| {
        let mut row = Vec::with_capacity(2 * n + 2);
        row.extend(coefficients.iter().copied());
        row.extend(coefficients.iter().map(|&value| -value));
        row.push(1f64);
        row.push(constant);
        row
    };

    let mut rows = (0..inequalities.nr_constraints())
        .map(|i| row(inequalities.matrix().row(i).iter().copied().collect(), -inequalities.rhs()[i]))
        .collect::<Vec<_>>();
    if let Some(equalities) = equalities {
        for k in 0..equalities.nr_constraints() {
            let coefficients = equalities.matrix().row(k).iter().copied().collect::<Vec<_>>();
            let rhs = equalities.rhs()[k];
            rows.push(row(coefficients.clone(), -rhs));
            rows.push(row(coefficients.iter().map(|&value| -value).collect(), rhs));
        }
    }

    let mut cost = vec![0f64; 2 * n + 2];
    cost[level_column(n)] = 1f64;

    let row_labels = (0..rows.len())
        .map(|i| Label::new(LabelType::Basic, 2 * n + 1 + i))
        .collect();
    let column_labels = (0..n).map(|j| Label::new(LabelType::NonBasic, j))
        .chain((0..n).map(|j| Label::new(LabelType::NonBasic, n + j)))
        .chain(Some(Label::new(LabelType::Artificial, level_column(n))))
        .collect();

    Tableau::new(rows, cost, row_labels, column_labels)
}

/// Row with the most negative right-hand side, if any is negative beyond `epsilon`.
///
/// Ties go to the smallest subscript.
fn most_violated_row(tableau: &Tableau<f64>, epsilon: f64) -> Option<usize> {
    (0..tableau.nr_rows())
        .filter(|&i| tableau.rhs(i) < -epsilon)
        .min_by(|&i, &j| {
            tableau.rhs(i).total_cmp(&tableau.rhs(j))
                .then(tableau.row_label(i).index.cmp(&tableau.row_label(j).index))
        })
}
