//! # Storing of quadratic programs in memory
//!
//! This module provides the data structures used to represent quadratic programs in memory, and
//! the dense linear algebra done on them. Algorithms may introduce their specific data structures
//! in `algorithm::my_algorithm`.
pub mod linear_algebra;
pub mod quadratic_program;
