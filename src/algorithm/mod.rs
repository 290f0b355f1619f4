//! # Algorithms
//!
//! The active-set method in `active_set` does the optimization, the Simplex method in `simplex`
//! provides it with a feasible starting point.
pub mod active_set;
pub mod simplex;
