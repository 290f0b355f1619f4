//! # Solver configuration
//!
//! A single tolerance is used for every numerical decision (zero tests, tie-breaks and sign
//! tests), it can't be overridden per call.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which pivot rule phase one uses to move between vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PivotRuleKind {
    /// Enter the column with the most negative relative cost.
    ///
    /// Fast, but can cycle on degenerate problems.
    SteepestDescent,
    /// Bland's rule: enter the profitable column with the smallest subscript.
    #[default]
    SmallestSubscript,
}

/// What the active-set solver does when the step length along a direction is numerically zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DegenerateStepPolicy {
    /// Stop and return the current point without confirming optimality.
    #[default]
    Stop,
    /// Add the blocking constraint to the working set without moving and keep iterating.
    ///
    /// This does not guarantee termination, the iteration budget still applies.
    AddBlocking,
}

/// Parameters shared by phase one and the active-set iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Tolerance for all zero, sign and tie comparisons.
    pub epsilon: f64,
    /// Maximum number of active-set iterations.
    pub max_iterations: usize,
    /// Pivot rule used in phase one.
    pub pivot_rule: PivotRuleKind,
    /// Behavior on a zero-length step.
    pub degenerate_step: DegenerateStepPolicy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-8,
            max_iterations: 200,
            pivot_rule: PivotRuleKind::default(),
            degenerate_step: DegenerateStepPolicy::default(),
        }
    }
}

impl SolverConfig {
    /// Use a different tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Use a different iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Use a different pivot rule in phase one.
    pub fn with_pivot_rule(mut self, pivot_rule: PivotRuleKind) -> Self {
        self.pivot_rule = pivot_rule;
        self
    }

    /// Use a different policy for zero-length steps.
    pub fn with_degenerate_step(mut self, degenerate_step: DegenerateStepPolicy) -> Self {
        self.degenerate_step = degenerate_step;
        self
    }

    /// Check that the values can be used by the solver.
    pub fn validate(&self) -> Result<()> {
        // Stays below the length of a full step
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(Error::Configuration(format!(
                "epsilon should lie strictly between 0 and 1, got {}", self.epsilon,
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::Configuration("max_iterations should be at least 1".to_string()));
        }

        Ok(())
    }
}
