//! # Quadratic programs
//!
//! Problems of the form
//!
//! ```text
//! minimize    1/2 x' H x + p' x
//! subject to  A x >= b
//!             Aeq x = beq   (optional)
//! ```
//!
//! with `H` symmetric positive definite. Problems are immutable once created; solvers only read
//! them.
use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// A system of linear constraints `matrix * x (>= or =) rhs`.
///
/// Whether the rows are inequalities or equalities is decided by the field of the
/// `QuadraticProgram` they are stored in.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraints {
    matrix: DMatrix<f64>,
    rhs: DVector<f64>,
}

impl LinearConstraints {
    /// Create a new system of constraints.
    ///
    /// # Errors
    ///
    /// `Error::Dimension` if the number of rows of `matrix` is not the length of `rhs`.
    pub fn new(matrix: DMatrix<f64>, rhs: DVector<f64>) -> Result<Self> {
        if matrix.nrows() != rhs.len() {
            return Err(Error::Dimension(format!(
                "constraint matrix has {} rows, right-hand side has length {}", matrix.nrows(), rhs.len(),
            )));
        }

        Ok(Self { matrix, rhs })
    }

    /// A system without any constraints on `nr_variables` variables.
    pub fn empty(nr_variables: usize) -> Self {
        Self {
            matrix: DMatrix::zeros(0, nr_variables),
            rhs: DVector::zeros(0),
        }
    }

    /// Coefficients, one row per constraint.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Right-hand side, one value per constraint.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Number of constraints.
    pub fn nr_constraints(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of variables the constraints are on.
    pub fn nr_variables(&self) -> usize {
        self.matrix.ncols()
    }

    /// Constraint values minus right-hand side: `matrix * x - rhs`.
    pub fn residuals(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.nr_variables());

        &self.matrix * x - &self.rhs
    }
}

/// A convex quadratic program with linear inequality and equality constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticProgram {
    hessian: DMatrix<f64>,
    linear: DVector<f64>,
    inequalities: LinearConstraints,
    equalities: Option<LinearConstraints>,
}

impl QuadraticProgram {
    /// Create a problem without equality constraints.
    ///
    /// Only sizes are checked here, definiteness of the hessian is checked by the solver before it
    /// starts iterating.
    ///
    /// # Arguments
    ///
    /// * `hessian`: Square matrix `H` of the quadratic term.
    /// * `linear`: Vector `p` of the linear term.
    /// * `inequalities`: Constraints `A x >= b`.
    pub fn new(
        hessian: DMatrix<f64>,
        linear: DVector<f64>,
        inequalities: LinearConstraints,
    ) -> Result<Self> {
        let n = linear.len();
        if hessian.nrows() != n || hessian.ncols() != n {
            return Err(Error::Dimension(format!(
                "hessian should be {}x{}, got {}x{}", n, n, hessian.nrows(), hessian.ncols(),
            )));
        }
        if inequalities.nr_variables() != n {
            return Err(Error::Dimension(format!(
                "inequality constraints are on {} variables, expected {}", inequalities.nr_variables(), n,
            )));
        }

        Ok(Self { hessian, linear, inequalities, equalities: None })
    }

    /// Add equality constraints `Aeq x = beq`.
    pub fn with_equalities(mut self, equalities: LinearConstraints) -> Result<Self> {
        if equalities.nr_variables() != self.nr_variables() {
            return Err(Error::Dimension(format!(
                "equality constraints are on {} variables, expected {}",
                equalities.nr_variables(), self.nr_variables(),
            )));
        }

        self.equalities = Some(equalities);
        Ok(self)
    }

    /// Number of variables `n`.
    pub fn nr_variables(&self) -> usize {
        self.linear.len()
    }

    /// The quadratic term `H`.
    pub fn hessian(&self) -> &DMatrix<f64> {
        &self.hessian
    }

    /// The linear term `p`.
    pub fn linear(&self) -> &DVector<f64> {
        &self.linear
    }

    /// Constraints `A x >= b`.
    pub fn inequalities(&self) -> &LinearConstraints {
        &self.inequalities
    }

    /// Constraints `Aeq x = beq`, if any.
    pub fn equalities(&self) -> Option<&LinearConstraints> {
        self.equalities.as_ref()
    }

    /// Objective value `1/2 x' H x + p' x`.
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        debug_assert_eq!(x.len(), self.nr_variables());

        0.5 * x.dot(&(&self.hessian * x)) + self.linear.dot(x)
    }

    /// Gradient `H x + p` of the objective.
    pub fn gradient(&self, x: &DVector<f64>) -> DVector<f64> {
        debug_assert_eq!(x.len(), self.nr_variables());

        &self.hessian * x + &self.linear
    }

    /// Slack `A x - b` of every inequality constraint, nonnegative where satisfied.
    pub fn inequality_residuals(&self, x: &DVector<f64>) -> DVector<f64> {
        self.inequalities.residuals(x)
    }

    /// Largest amount by which `x` violates a constraint, zero if `x` is feasible.
    pub fn max_violation(&self, x: &DVector<f64>) -> f64 {
        debug_assert_eq!(x.len(), self.nr_variables());

        let inequality = self.inequality_residuals(x).iter()
            .fold(0f64, |violation, &residual| violation.max(-residual));
        let equality = self.equalities.as_ref()
            .map_or(0f64, |equalities| equalities.residuals(x).amax());

        inequality.max(equality)
    }

    /// Check that the hessian is symmetric positive definite.
    ///
    /// # Errors
    ///
    /// `Error::NotSymmetric` if two mirrored elements differ more than `epsilon` relative to the
    /// largest element, `Error::NotPositiveDefinite` if a Cholesky factorization does not exist.
    pub fn check_hessian(&self, epsilon: f64) -> Result<()> {
        let scale = self.hessian.amax().max(1f64);
        let asymmetry = (&self.hessian - self.hessian.transpose()).amax();
        if asymmetry > epsilon * scale {
            return Err(Error::NotSymmetric);
        }

        match self.hessian.clone().cholesky() {
            Some(_) => Ok(()),
            None => Err(Error::NotPositiveDefinite),
        }
    }
}
