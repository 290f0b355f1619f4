//! # The Simplex algorithm
//!
//! A dense tableau implementation of the primal Simplex method. It is used to find a first
//! feasible point for the active-set method, see the `phase_one` module.
use num_traits::Float;

use crate::algorithm::simplex::strategy::pivot_rule::PivotRule;
use crate::algorithm::simplex::tableau::Tableau;
use crate::error::Result;

pub mod phase_one;
pub mod strategy;
pub mod tableau;

/// How a run of the primal Simplex method ended, if it didn't end in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplexOutcome {
    /// No column with a negative relative cost is left.
    Optimal,
    /// The pivot budget was used up before reaching optimality.
    PivotLimit,
}

/// Reduces the cost of the basic feasible solution as far as possible.
///
/// # Arguments
///
/// * `tableau`: Tableau in a primal feasible state.
/// * `rule`: Decides which pivot to make in each iteration.
/// * `max_pivots`: Number of pivots after which the method gives up.
///
/// # Return value
///
/// How the method ended, and the number of pivots that were made.
///
/// # Errors
///
/// `Error::Unbounded` if the cost can be decreased without bound.
pub fn primal<F, PR>(
    tableau: &mut Tableau<F>,
    rule: &PR,
    max_pivots: usize,
) -> Result<(SimplexOutcome, usize)>
where
    F: Float,
    PR: PivotRule<F>,
{
    let mut nr_pivots = 0;
    loop {
        debug_assert!(tableau.is_primal_feasible(rule.epsilon()));

        match rule.select_pivot(tableau)? {
            None => break Ok((SimplexOutcome::Optimal, nr_pivots)),
            Some(_) if nr_pivots == max_pivots => break Ok((SimplexOutcome::PivotLimit, nr_pivots)),
            Some(pivot) => {
                tracing::trace!(
                    pivot = nr_pivots,
                    entering = %tableau.column_label(pivot.column),
                    leaving = %tableau.row_label(pivot.row),
                    "simplex pivot",
                );
                tableau.pivot(pivot);
                nr_pivots += 1;
            },
        }
    }
}
