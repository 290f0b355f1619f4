//! # Primal active-set method
//!
//! Solves convex quadratic programs
//!
//! ```text
//! minimize    1/2 x' H x + p' x
//! subject to  A x >= b
//!             Aeq x = beq
//! ```
//!
//! by moving between feasible points. Each iteration treats the constraints in the working set as
//! equalities and computes the best direction under those equalities. If the direction is zero,
//! the Lagrange multipliers decide between optimality and dropping a constraint. Otherwise the
//! step along the direction is cut short at the first constraint that would be violated, which is
//! then added to the working set.
//!
//! The iteration state is a value that is moved through `ActiveSetSolver::step`, so that a solve can
//! be inspected (and tested) one iteration at a time.
use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::algorithm::active_set::working_set::{ActivePosition, ConstraintIndex, WorkingSet};
use crate::algorithm::simplex::phase_one::find_feasible_point;
use crate::config::{DegenerateStepPolicy, SolverConfig};
use crate::data::linear_algebra::{least_squares, solve_equality_constrained, stack_rows};
use crate::data::quadratic_program::{LinearConstraints, QuadraticProgram};
use crate::error::{Error, Result};

pub mod working_set;

/// Primal active-set solver for convex quadratic programs.
#[derive(Debug, Clone, Default)]
pub struct ActiveSetSolver {
    config: SolverConfig,
}

/// Everything that changes between two iterations.
///
/// Not `Clone`: a state is consumed by each step and a new one is returned.
#[derive(Debug)]
pub struct IterationState<'a> {
    x: DVector<f64>,
    working_set: WorkingSet<'a>,
    iteration: usize,
}

impl<'a> IterationState<'a> {
    /// Current point, feasible for all constraints.
    pub fn x(&self) -> &DVector<f64> {
        &self.x
    }

    /// Inequality constraints currently treated as equalities.
    pub fn working_set(&self) -> &WorkingSet<'a> {
        &self.working_set
    }

    /// Number of steps taken so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }
}

/// Result of a single iteration.
#[derive(Debug)]
pub enum Step<'a> {
    /// The working set or the point changed, iteration continues.
    Iterating(IterationState<'a>),
    /// The current point satisfies the optimality conditions.
    Converged {
        /// Final state.
        state: IterationState<'a>,
        /// Lagrange multipliers certifying optimality.
        multipliers: Multipliers,
    },
    /// The step length was zero and the configured policy is to stop.
    Stalled(IterationState<'a>),
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The optimality conditions hold at the minimizer.
    Converged,
    /// The iteration budget ran out; the minimizer is the last point reached.
    MaxIterationsExceeded,
    /// A step of length zero was encountered; the minimizer is the point where that happened.
    DegenerateStep,
}

/// Lagrange multipliers at an optimal point.
#[derive(Debug, Clone, PartialEq)]
pub struct Multipliers {
    /// One per active inequality constraint, in the order of `Solution::active_constraints`.
    ///
    /// All nonnegative up to the tolerance.
    pub inequality: DVector<f64>,
    /// One per equality constraint.
    pub equality: DVector<f64>,
}

/// Outcome of a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    minimizer: DVector<f64>,
    objective_value: f64,
    status: Status,
    iterations: usize,
    active_constraints: Vec<ConstraintIndex>,
    multipliers: Option<Multipliers>,
}

impl Solution {
    fn new(
        problem: &QuadraticProgram,
        state: IterationState,
        status: Status,
        multipliers: Option<Multipliers>,
    ) -> Self {
        Self {
            objective_value: problem.objective(&state.x),
            active_constraints: state.working_set.indices().to_vec(),
            minimizer: state.x,
            status,
            iterations: state.iteration,
            multipliers,
        }
    }

    /// Best point found.
    pub fn minimizer(&self) -> &DVector<f64> {
        &self.minimizer
    }

    /// Objective value at the minimizer.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// How the solve ended.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the minimizer is known to be optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == Status::Converged
    }

    /// Number of iterations done.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Inequality constraints in the final working set, in increasing order.
    pub fn active_constraints(&self) -> &[ConstraintIndex] {
        &self.active_constraints
    }

    /// Lagrange multipliers, only available if the solve converged.
    pub fn multipliers(&self) -> Option<&Multipliers> {
        self.multipliers.as_ref()
    }
}

impl ActiveSetSolver {
    /// Create a solver.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Parameters of this solver.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a problem, starting from a point found by phase one.
    ///
    /// # Errors
    ///
    /// Configuration errors, `Error::NotSymmetric` or `Error::NotPositiveDefinite` for a bad
    /// hessian, and the phase one errors `Error::Infeasible` and `Error::PhaseOneIterationLimit`.
    pub fn solve(&self, problem: &QuadraticProgram) -> Result<Solution> {
        self.config.validate()?;
        problem.check_hessian(self.config.epsilon)?;

        let x0 = find_feasible_point(problem.inequalities(), problem.equalities(), &self.config)?;
        let state = self.seed(problem, x0)?;
        self.iterate(problem, state)
    }

    /// Solve a problem, starting from a given feasible point.
    ///
    /// # Errors
    ///
    /// See `initialize`.
    pub fn solve_from(&self, problem: &QuadraticProgram, x0: DVector<f64>) -> Result<Solution> {
        let state = self.initialize(problem, x0)?;
        self.iterate(problem, state)
    }

    /// Create the state for the first iteration.
    ///
    /// The working set starts out with all inequality constraints that are active at `x0`.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` for invalid parameters, `Error::NotSymmetric` or
    /// `Error::NotPositiveDefinite` for a bad hessian, `Error::Dimension` if `x0` has the wrong
    /// length and `Error::InitialPointInfeasible` if it violates a constraint.
    pub fn initialize<'a>(
        &self,
        problem: &'a QuadraticProgram,
        x0: DVector<f64>,
    ) -> Result<IterationState<'a>> {
        self.config.validate()?;
        problem.check_hessian(self.config.epsilon)?;
        self.seed(problem, x0)
    }

    /// Initial state for a problem and configuration that were already checked.
    fn seed<'a>(
        &self,
        problem: &'a QuadraticProgram,
        x0: DVector<f64>,
    ) -> Result<IterationState<'a>> {
        if x0.len() != problem.nr_variables() {
            return Err(Error::Dimension(format!(
                "initial point has length {}, expected {}", x0.len(), problem.nr_variables(),
            )));
        }
        let violation = problem.max_violation(&x0);
        if violation > self.config.epsilon {
            return Err(Error::InitialPointInfeasible { violation });
        }

        let mut working_set = WorkingSet::new(problem.inequalities().matrix());
        working_set.add_all(
            problem.inequality_residuals(&x0).iter().enumerate()
                .filter(|&(_, residual)| residual.abs() <= self.config.epsilon)
                .map(|(i, _)| ConstraintIndex(i))
        );

        Ok(IterationState { x: x0, working_set, iteration: 0 })
    }

    /// Do a single iteration.
    ///
    /// # Errors
    ///
    /// `Error::LinearAlgebra` if a linear system could not be solved.
    pub fn step<'a>(
        &self,
        problem: &'a QuadraticProgram,
        mut state: IterationState<'a>,
    ) -> Result<Step<'a>> {
        let epsilon = self.config.epsilon;
        let n = problem.nr_variables();
        state.iteration += 1;

        let gradient = problem.gradient(&state.x);
        let constraints = stack_rows(
            state.working_set.active_submatrix(),
            problem.equalities().map(LinearConstraints::matrix),
        );
        // With `n` or more rows the direction is zero only if the gradient lies in their span
        let stationary = if constraints.nrows() >= n {
            self.stationary_multipliers(&constraints, &gradient, state.working_set.len())?
        } else {
            None
        };
        let direction = match stationary {
            Some(_) => DVector::zeros(n),
            None => solve_equality_constrained(problem.hessian(), &gradient, &constraints, epsilon)?,
        };

        if direction.amax() < epsilon {
            let multipliers = match stationary {
                Some(multipliers) => multipliers,
                None => self.multipliers(&constraints, &gradient, state.working_set.len())?,
            };
            if state.working_set.is_empty() {
                return Ok(Step::Converged { state, multipliers });
            }

            return match multipliers.inequality.iter().position_min_by(|a, b| a.total_cmp(b)) {
                Some(position) if multipliers.inequality[position] < -epsilon => {
                    let removed = state.working_set.remove(ActivePosition(position));
                    tracing::debug!(
                        iteration = state.iteration,
                        objective = problem.objective(&state.x),
                        removed = removed.0,
                        multiplier = multipliers.inequality[position],
                        working_set = state.working_set.len(),
                        "dropping constraint",
                    );
                    Ok(Step::Iterating(state))
                },
                _ => Ok(Step::Converged { state, multipliers }),
            };
        }

        let (step_length, blocking) = self.step_length(problem, &state, &direction);
        if step_length < epsilon {
            // Only a blocking row cuts the step length below 1
            let Some(blocking) = blocking else { return Ok(Step::Stalled(state)) };
            return match self.config.degenerate_step {
                DegenerateStepPolicy::Stop => {
                    tracing::debug!(iteration = state.iteration, blocking = blocking.0, "degenerate step");
                    Ok(Step::Stalled(state))
                },
                DegenerateStepPolicy::AddBlocking => {
                    state.working_set.add(blocking);
                    tracing::debug!(
                        iteration = state.iteration,
                        added = blocking.0,
                        working_set = state.working_set.len(),
                        "degenerate step, adding blocking constraint",
                    );
                    Ok(Step::Iterating(state))
                },
            };
        }

        state.x += step_length * &direction;
        if let Some(blocking) = blocking {
            state.working_set.add(blocking);
        }
        tracing::debug!(
            iteration = state.iteration,
            objective = problem.objective(&state.x),
            step_length,
            working_set = state.working_set.len(),
            "step",
        );

        Ok(Step::Iterating(state))
    }

    fn iterate<'a>(
        &self,
        problem: &'a QuadraticProgram,
        mut state: IterationState<'a>,
    ) -> Result<Solution> {
        loop {
            if state.iteration >= self.config.max_iterations {
                tracing::warn!(
                    iterations = state.iteration,
                    "iteration limit reached, optimality not confirmed",
                );
                break Ok(Solution::new(problem, state, Status::MaxIterationsExceeded, None));
            }

            state = match self.step(problem, state)? {
                Step::Iterating(state) => state,
                Step::Converged { state, multipliers } => {
                    let solution = Solution::new(problem, state, Status::Converged, Some(multipliers));
                    tracing::info!(
                        iterations = solution.iterations(),
                        objective = solution.objective_value(),
                        "converged",
                    );
                    break Ok(solution);
                },
                Step::Stalled(state) => {
                    tracing::warn!(
                        iterations = state.iteration,
                        "zero step length, optimality not confirmed",
                    );
                    break Ok(Solution::new(problem, state, Status::DegenerateStep, None));
                },
            };
        }
    }

    /// Solve `C' mu = g` and split the result into inequality and equality multipliers.
    fn multipliers(
        &self,
        constraints: &DMatrix<f64>,
        gradient: &DVector<f64>,
        nr_active: usize,
    ) -> Result<Multipliers> {
        let all = least_squares(&constraints.transpose(), gradient, self.config.epsilon)?;

        Ok(Multipliers {
            inequality: all.rows(0, nr_active).into_owned(),
            equality: all.rows(nr_active, all.len() - nr_active).into_owned(),
        })
    }

    /// Multipliers solving `C' mu = g` exactly, up to the tolerance.
    ///
    /// # Return value
    ///
    /// `None` if `g` is not in the row space of `C`, for example because rows of a rank deficient
    /// `C` are parallel while `g` is not.
    fn stationary_multipliers(
        &self,
        constraints: &DMatrix<f64>,
        gradient: &DVector<f64>,
        nr_active: usize,
    ) -> Result<Option<Multipliers>> {
        let multipliers = self.multipliers(constraints, gradient, nr_active)?;
        let stacked = DVector::from_iterator(
            constraints.nrows(),
            multipliers.inequality.iter().chain(multipliers.equality.iter()).copied(),
        );
        let residual = (constraints.tr_mul(&stacked) - gradient).amax();

        if residual <= self.config.epsilon * gradient.amax().max(1f64) {
            Ok(Some(multipliers))
        } else {
            tracing::trace!(residual, "working set rows don't span the gradient");
            Ok(None)
        }
    }

    /// How far to move along `direction` without leaving the feasible region.
    ///
    /// # Return value
    ///
    /// The step length, at most `1`, and the first constraint to attain it if it is below `1`.
    fn step_length(
        &self,
        problem: &QuadraticProgram,
        state: &IterationState,
        direction: &DVector<f64>,
    ) -> (f64, Option<ConstraintIndex>) {
        let inequalities = problem.inequalities();
        let slopes = inequalities.matrix() * direction;
        let residuals = inequalities.residuals(&state.x);

        let mut step = (1f64, None);
        for i in 0..inequalities.nr_constraints() {
            let index = ConstraintIndex(i);
            if state.working_set.contains(index) || slopes[i] >= 0f64 {
                continue;
            }

            let ratio = residuals[i].max(0f64) / -slopes[i];
            if ratio < step.0 {
                step = (ratio, Some(index));
            }
        }

        step
    }
}
