//! # Linear algebra services
//!
//! Dense routines the active-set method is built upon: assembling constraint matrices, solving
//! the equality constrained direction problem and recovering Lagrange multipliers.
use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Put the rows of `bottom` below the rows of `top`.
///
/// Both matrices should have the same number of columns.
pub fn stack_rows(top: &DMatrix<f64>, bottom: Option<&DMatrix<f64>>) -> DMatrix<f64> {
    match bottom {
        None => top.clone(),
        Some(bottom) => {
            debug_assert_eq!(top.ncols(), bottom.ncols());

            let split = top.nrows();
            DMatrix::from_fn(split + bottom.nrows(), top.ncols(), |i, j| {
                if i < split { top[(i, j)] } else { bottom[(i - split, j)] }
            })
        },
    }
}

/// Least squares solution of `matrix * y = rhs` with the smallest norm.
///
/// Works for square, over- and underdetermined systems alike. Singular values below `epsilon`,
/// relative to the largest one, are treated as zero.
pub fn least_squares(matrix: &DMatrix<f64>, rhs: &DVector<f64>, epsilon: f64) -> Result<DVector<f64>> {
    debug_assert_eq!(matrix.nrows(), rhs.len());

    if matrix.nrows() == 0 || matrix.ncols() == 0 {
        return Ok(DVector::zeros(matrix.ncols()));
    }

    let svd = matrix.clone().svd(true, true);
    let tolerance = epsilon * svd.singular_values.max().max(1f64);
    svd.solve(rhs, tolerance).map_err(Error::LinearAlgebra)
}

/// Solve the equality constrained quadratic problem
///
/// ```text
/// minimize    1/2 d' H d + g' d
/// subject to  C d = 0
/// ```
///
/// through its KKT system `[H C'; C 0] [d; l] = [-g; 0]`.
///
/// # Arguments
///
/// * `hessian`: Positive definite `H` of size `n x n`.
/// * `gradient`: Linear term `g` of length `n`.
/// * `constraints`: Matrix `C` with `n` columns. It may be rank deficient and have `n` or more
/// rows.
/// * `epsilon`: Relative tolerance for singular values.
///
/// # Return value
///
/// The minimizing direction `d`.
pub fn solve_equality_constrained(
    hessian: &DMatrix<f64>,
    gradient: &DVector<f64>,
    constraints: &DMatrix<f64>,
    epsilon: f64,
) -> Result<DVector<f64>> {
    let n = gradient.len();
    debug_assert_eq!(hessian.shape(), (n, n));
    debug_assert_eq!(constraints.ncols(), n);

    if constraints.nrows() == 0 {
        return match hessian.clone().cholesky() {
            Some(cholesky) => Ok(-cholesky.solve(gradient)),
            None => Err(Error::NotPositiveDefinite),
        };
    }

    let k = constraints.nrows();
    let kkt = DMatrix::from_fn(n + k, n + k, |i, j| match (i < n, j < n) {
        (true, true) => hessian[(i, j)],
        (true, false) => constraints[(j - n, i)],
        (false, true) => constraints[(i - n, j)],
        (false, false) => 0f64,
    });
    let rhs = DVector::from_fn(n + k, |i, _| if i < n { -gradient[i] } else { 0f64 });

    let solution = least_squares(&kkt, &rhs, epsilon)?;
    Ok(solution.rows(0, n).into_owned())
}
