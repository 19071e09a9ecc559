// src/error.rs
use thiserror::Error;

/// Error type for every pricing operation in the crate.
///
/// All variants are fatal for the call that produced them: a pricing run
/// either returns a price or aborts, there is no partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid engine configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Lattice branch probability outside [0, 1]
    #[error("{lattice} probability '{branch}' = {value:.6} lies outside [0, 1]; market data and step count cannot be represented")]
    InvalidProbability {
        lattice: String,
        branch: String,
        value: f64,
    },

    /// Gaussian elimination hit a pivot below tolerance
    #[error("Matrix is singular or nearly singular: pivot {pivot:e} in column {column}")]
    SingularMatrix { column: usize, pivot: f64 },

    /// Operand shapes do not agree
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Engine invoked on an exercise style it does not support
    #[error("{engine} cannot price {style} options")]
    StyleMismatch { engine: String, style: String },

    /// Numerical instability or non-finite result
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        if value <= 0.0 || value.is_nan() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn validate_positive_finite(name: &str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        validate_positive(name, value)
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &str, value: f64, min: f64, max: f64) -> PricingResult<()> {
        if !(min..=max).contains(&value) {
            Err(PricingError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate paths count
    pub fn validate_paths(paths: usize) -> PricingResult<()> {
        if paths == 0 {
            Err(PricingError::InvalidConfiguration {
                field: "num_paths".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > 100_000_000 {
            Err(PricingError::InvalidConfiguration {
                field: "num_paths".to_string(),
                reason: "exceeds maximum allowed (100 million)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(field: &str, steps: usize) -> PricingResult<()> {
        if steps == 0 {
            Err(PricingError::InvalidConfiguration {
                field: field.to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > 100_000 {
            Err(PricingError::InvalidConfiguration {
                field: field.to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
