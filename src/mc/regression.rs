// src/mc/regression.rs
//! Least-squares continuation-value regression
//!
//! # Basis
//!
//! Laguerre polynomials built upward from degree 0 by the three-term
//! recursion, so every degree comes from the same definition:
//! ```text
//! L₀(x) = 1
//! L₁(x) = 1 - x
//! Lᵢ(x) = ((2i - 1 - x) Lᵢ₋₁(x) - (i - 1) Lᵢ₋₂(x)) / i
//! ```
//! giving e.g. `L₂ = 1 - 2x + x²/2` and `L₃ = 1 - 3x + 3x²/2 - x³/6`.
//! `{L₀..L_d}` spans the polynomials of degree ≤ d.
//!
//! # Standardisation
//!
//! Samples are mapped to `z = (x - x̄) / s_x` (population standard
//! deviation) before the basis is evaluated. A tight cluster of abscissae
//! such as in-the-money spots a few percent below the strike otherwise
//! makes the cubic columns of `AᵗA` collinear to within the pivot
//! tolerance. The affine map leaves the span, and so the fitted values,
//! unchanged. A sample set with no spread keeps `s_x = 1`, so identical
//! abscissae still surface as a singular system.
//!
//! # Estimator
//!
//! With design matrix `Aᵢⱼ = Lⱼ(zᵢ)` the coefficients solve the normal
//! equations
//! ```text
//! AᵗA β = Aᵗy
//! ```
//! by Gaussian elimination. This is plain OLS: no ridge term, no bias
//! correction.

use crate::error::{PricingError, PricingResult};
use crate::linalg;
use nalgebra::{DMatrix, DVector};

/// Relative spread below which a sample set is treated as a single point.
const DEGENERATE_SPREAD: f64 = 1e-12;

/// Laguerre basis values `[L₀(x), ..., L_degree(x)]`.
pub fn laguerre_basis(x: f64, degree: usize) -> Vec<f64> {
    let mut basis = Vec::with_capacity(degree + 1);
    basis.push(1.0);
    if degree >= 1 {
        basis.push(1.0 - x);
    }
    for i in 2..=degree {
        let fi = i as f64;
        let next = ((2.0 * fi - 1.0 - x) * basis[i - 1] - (fi - 1.0) * basis[i - 2]) / fi;
        basis.push(next);
    }
    basis
}

/// Fitted coefficients `β₀..β_d` of a continuation-value estimator,
/// in the standardised coordinate of the sample set they were fitted on.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionCoefficients {
    beta: Vec<f64>,
    centre: f64,
    scale: f64,
}

impl RegressionCoefficients {
    pub fn degree(&self) -> usize {
        self.beta.len() - 1
    }

    /// Coefficients of `L₀(z)..L_d(z)`.
    pub fn as_slice(&self) -> &[f64] {
        &self.beta
    }

    /// Sample mean subtracted before scaling.
    pub fn centre(&self) -> f64 {
        self.centre
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn standardize(&self, x: f64) -> f64 {
        (x - self.centre) / self.scale
    }

    /// `Σⱼ βⱼ Lⱼ(z)` with `z` the standardised `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        laguerre_basis(self.standardize(x), self.degree())
            .iter()
            .zip(&self.beta)
            .map(|(l, b)| l * b)
            .sum()
    }
}

/// Fit `ys ≈ Σⱼ βⱼ Lⱼ(xs)` by ordinary least squares.
///
/// The caller guarantees at least `degree + 1` samples; fewer samples
/// make `AᵗA` singular and surface as [`PricingError::SingularMatrix`].
pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> PricingResult<RegressionCoefficients> {
    if xs.is_empty() {
        return Err(PricingError::DimensionMismatch {
            context: "regression samples".to_string(),
            expected: degree + 1,
            actual: 0,
        });
    }
    if xs.len() != ys.len() {
        return Err(PricingError::DimensionMismatch {
            context: "regression targets".to_string(),
            expected: xs.len(),
            actual: ys.len(),
        });
    }

    let n = xs.len();
    let (centre, scale) = centre_and_scale(xs);
    let m = degree + 1;
    let mut design = DMatrix::<f64>::zeros(n, m);
    for (i, &x) in xs.iter().enumerate() {
        let z = (x - centre) / scale;
        for (j, value) in laguerre_basis(z, degree).into_iter().enumerate() {
            design[(i, j)] = value;
        }
    }
    let y = DVector::from_column_slice(ys);

    let ata = design.tr_mul(&design);
    let aty = design.tr_mul(&y);
    let beta = linalg::solve(ata, aty)?;

    Ok(RegressionCoefficients {
        beta: beta.iter().copied().collect(),
        centre,
        scale,
    })
}

fn centre_and_scale(xs: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    let spread = (xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
    if spread > DEGENERATE_SPREAD * mean.abs().max(1.0) {
        (mean, spread)
    } else {
        (mean, 1.0)
    }
}
