//! # A convex quadratic program solver
//!
//! Quadratic programs with a positive definite hessian and linear inequality and equality
//! constraints are solved using the primal active-set method, as described in chapter 16 of
//! Numerical Optimization by Jorge Nocedal and Stephen J. Wright. A first feasible point is
//! computed with the Simplex Method as described in the book Combinatorial Optimization by
//! Christos H. Papadimitriou and Kenneth Steiglitz.
//!
//! ```
//! use nalgebra::{DMatrix, DVector};
//! use rasqp::{ActiveSetSolver, LinearConstraints, QuadraticProgram, SolverConfig};
//!
//! // minimize x1^2 + x2^2 subject to x1 >= 1, x2 >= 1
//! let problem = QuadraticProgram::new(
//!     DMatrix::from_diagonal_element(2, 2, 2.0),
//!     DVector::zeros(2),
//!     LinearConstraints::new(DMatrix::identity(2, 2), DVector::from_element(2, 1.0))?,
//! )?;
//! let solution = ActiveSetSolver::new(SolverConfig::default()).solve(&problem)?;
//! assert!(solution.is_optimal());
//! assert!((solution.objective_value() - 2.0).abs() < 1e-8);
//! # Ok::<(), rasqp::Error>(())
//! ```
#![warn(missing_docs)]

pub mod algorithm;
pub mod config;
pub mod data;
pub mod error;

pub use crate::algorithm::active_set::{ActiveSetSolver, Multipliers, Solution, Status};
pub use crate::config::{DegenerateStepPolicy, PivotRuleKind, SolverConfig};
pub use crate::data::quadratic_program::{LinearConstraints, QuadraticProgram};
pub use crate::error::{Error, Result};
