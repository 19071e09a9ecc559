// src/linalg.rs
//! Dense linear system solver
//!
//! Gaussian elimination with partial pivoting on `nalgebra` storage. At
//! column `i` the row with the largest `|a_ki|` (k ≥ i) is swapped into the
//! pivot position, the column is eliminated below the diagonal, and the
//! upper-triangular system is back-substituted.
//!
//! A post-pivot diagonal below [`PIVOT_TOLERANCE`] is reported as
//! [`PricingError::SingularMatrix`]; the solver does not regularise or retry.

use crate::error::{PricingError, PricingResult};
use nalgebra::{DMatrix, DVector};

/// Smallest pivot magnitude accepted by [`solve`].
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Solve `A·x = b` for square `A`.
///
/// Takes ownership of both operands since elimination overwrites them.
pub fn solve(mut a: DMatrix<f64>, mut b: DVector<f64>) -> PricingResult<DVector<f64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(PricingError::DimensionMismatch {
            context: "solve: matrix columns".to_string(),
            expected: n,
            actual: a.ncols(),
        });
    }
    if b.len() != n {
        return Err(PricingError::DimensionMismatch {
            context: "solve: right-hand side".to_string(),
            expected: n,
            actual: b.len(),
        });
    }

    for i in 0..n {
        let mut max_row = i;
        let mut max_val = a[(i, i)].abs();
        for k in (i + 1)..n {
            if a[(k, i)].abs() > max_val {
                max_val = a[(k, i)].abs();
                max_row = k;
            }
        }

        if max_row != i {
            a.swap_rows(i, max_row);
            b.swap_rows(i, max_row);
        }

        let pivot = a[(i, i)];
        if pivot.abs() < PIVOT_TOLERANCE || !pivot.is_finite() {
            return Err(PricingError::SingularMatrix { column: i, pivot });
        }

        for k in (i + 1)..n {
            let factor = a[(k, i)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in i..n {
                a[(k, j)] -= factor * a[(i, j)];
            }
            b[k] -= factor * b[i];
        }
    }

    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| a[(i, j)] * x[j]).sum();
        x[i] = (b[i] - sum) / a[(i, i)];
    }

    Ok(x)
}
