//! # Errors
//!
//! Everything that can stop a solve before a `Solution` is produced.
//!
//! Running out of iterations or taking a degenerate step is not in this list: those end with a
//! `Solution` whose status tells that optimality was not confirmed.
use thiserror::Error;

/// Reasons for a solve, or a phase of it, to fail.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Matrix and vector sizes of the problem (or of an initial point) are inconsistent.
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// The quadratic term is not symmetric.
    #[error("the hessian is not symmetric")]
    NotSymmetric,

    /// The quadratic term is not positive definite, so the objective is not strictly convex.
    #[error("the hessian is not positive definite")]
    NotPositiveDefinite,

    /// The solver configuration can't be used.
    #[error("invalid solver configuration: {0}")]
    Configuration(String),

    /// Phase one found no point satisfying all constraints.
    ///
    /// The `slack` is the smallest uniform constraint relaxation that phase one could reach.
    #[error("the constraints are infeasible (minimal slack {slack})")]
    Infeasible {
        /// Minimal relaxation needed to satisfy all constraints.
        slack: f64,
    },

    /// The starting point given by the caller violates a constraint.
    #[error("the initial point violates a constraint by {violation}")]
    InitialPointInfeasible {
        /// Largest constraint violation at the initial point.
        violation: f64,
    },

    /// A column with a negative relative cost has no row limiting its increase.
    #[error("unbounded: column {column} can be increased without limit")]
    Unbounded {
        /// Index of the entering column.
        column: usize,
    },

    /// Phase one used up its pivot budget before reaching an optimal tableau.
    #[error("phase one did not finish within {pivots} pivots")]
    PhaseOneIterationLimit {
        /// Number of pivots that were done.
        pivots: usize,
    },

    /// A dense linear algebra routine failed.
    #[error("linear algebra failure: {0}")]
    LinearAlgebra(&'static str),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
