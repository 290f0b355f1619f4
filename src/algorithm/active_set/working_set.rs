//! # Working set
//!
//! The inequality constraints that are currently treated as equalities.
//!
//! Two kinds of indices are in play: the row of a constraint in the inequality matrix, and the
//! position of a constraint within the sorted working set. They are distinct types, so that one
//! can't be passed where the other is expected. Removal goes by position, because that is how the
//! Lagrange multipliers of the working set are ordered.
use std::fmt::{Display, Formatter, Result as FormatResult};

use itertools::Itertools;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Row of the inequality constraint matrix `A`, starting at `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConstraintIndex(pub usize);

/// Position within the sorted working set, starting at `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivePosition(pub usize);

impl Display for ConstraintIndex {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        write!(f, "{}", self.0)
    }
}

/// Sorted, duplicate free set of active inequality constraints.
///
/// The rows of `A` belonging to the set are kept as a separate matrix, which is rebuilt on every
/// change.
#[derive(Debug)]
pub struct WorkingSet<'a> {
    /// All inequality constraints, one per row.
    constraints: &'a DMatrix<f64>,
    /// Strictly increasing.
    indices: Vec<ConstraintIndex>,
    /// `constraints` restricted to the rows in `indices`, in that order.
    active: DMatrix<f64>,
}

impl<'a> WorkingSet<'a> {
    /// Create an empty working set.
    ///
    /// # Arguments
    ///
    /// * `constraints`: Inequality constraint matrix `A`, one row per constraint.
    pub fn new(constraints: &'a DMatrix<f64>) -> Self {
        Self {
            constraints,
            indices: Vec::new(),
            active: DMatrix::zeros(0, constraints.ncols()),
        }
    }

    /// Add a constraint.
    ///
    /// # Return value
    ///
    /// Whether the constraint was not yet in the set.
    pub fn add(&mut self, index: ConstraintIndex) -> bool {
        debug_assert!(index.0 < self.constraints.nrows());

        match self.indices.binary_search(&index) {
            Ok(_) => false,
            Err(position) => {
                self.indices.insert(position, index);
                self.rebuild();
                true
            },
        }
    }

    /// Add several constraints at once, ignoring the ones already present.
    pub fn add_all<I: IntoIterator<Item = ConstraintIndex>>(&mut self, indices: I) {
        let before = self.indices.len();
        self.indices.extend(indices);
        debug_assert!(self.indices.iter().all(|index| index.0 < self.constraints.nrows()));

        self.indices.sort_unstable();
        self.indices.dedup();
        if self.indices.len() != before {
            self.rebuild();
        }
    }

    /// Remove the constraint at a position.
    ///
    /// # Arguments
    ///
    /// * `position`: Position in the sorted set, in range `0` until `self.len()`.
    ///
    /// # Return value
    ///
    /// The constraint that was removed.
    pub fn remove(&mut self, position: ActivePosition) -> ConstraintIndex {
        debug_assert!(position.0 < self.len());

        let removed = self.indices.remove(position.0);
        self.rebuild();
        removed
    }

    /// Number of active constraints.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no constraints are active.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether a constraint is active.
    pub fn contains(&self, index: ConstraintIndex) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Constraint at a position.
    pub fn get(&self, position: ActivePosition) -> ConstraintIndex {
        self.indices[position.0]
    }

    /// All active constraints, in increasing order.
    pub fn indices(&self) -> &[ConstraintIndex] {
        &self.indices
    }

    /// Rows of `A` of the active constraints, in the order of `indices()`.
    pub fn active_submatrix(&self) -> &DMatrix<f64> {
        &self.active
    }

    fn rebuild(&mut self) {
        debug_assert!(self.indices.is_sorted());

        self.active = self.constraints.select_rows(self.indices.iter().map(|index| &index.0));
    }
}

impl Display for WorkingSet<'_> {
    fn fmt(&self, f: &mut Formatter) -> FormatResult {
        write!(f, "{{{}}}", self.indices.iter().join(", "))
    }
}
