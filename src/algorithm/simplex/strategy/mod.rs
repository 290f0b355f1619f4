//! # Strategies for the Simplex algorithm
//!
//! Module containing the decision on how to pivot. Which strategy is used is chosen at run time
//! through `config::PivotRuleKind`.
pub mod pivot_rule;
