// src/option.rs
//! Vanilla option contracts
//!
//! # Payoffs
//! - **Call**: max(S - K, 0)
//! - **Put**: max(K - S, 0)
//!
//! The payoff is a pure function of a single spot level. Lattice engines
//! evaluate it at every node and LSMC at every (path, time) pair, so it is
//! the same function whether applied at expiry or on early exercise.

use crate::error::{validation::*, PricingResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// When the holder may exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Exercise at expiry only
    European,
    /// Exercise at any time up to expiry
    American,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseStyle::European => write!(f, "EUROPEAN"),
            ExerciseStyle::American => write!(f, "AMERICAN"),
        }
    }
}

/// Immutable, validated option contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VanillaOption {
    strike: f64,
    expiry: f64,
    option_type: OptionType,
    style: ExerciseStyle,
}

impl VanillaOption {
    /// Build a contract; strike and expiry (in years) must be positive and finite.
    pub fn new(
        strike: f64,
        expiry: f64,
        option_type: OptionType,
        style: ExerciseStyle,
    ) -> PricingResult<Self> {
        validate_positive_finite("strike", strike)?;
        validate_positive_finite("expiry", expiry)?;
        Ok(Self {
            strike,
            expiry,
            option_type,
            style,
        })
    }

    pub fn european(strike: f64, expiry: f64, option_type: OptionType) -> PricingResult<Self> {
        Self::new(strike, expiry, option_type, ExerciseStyle::European)
    }

    pub fn american(strike: f64, expiry: f64, option_type: OptionType) -> PricingResult<Self> {
        Self::new(strike, expiry, option_type, ExerciseStyle::American)
    }

    pub fn strike(&self) -> f64 {
        self.strike
    }

    pub fn expiry(&self) -> f64 {
        self.expiry
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn style(&self) -> ExerciseStyle {
        self.style
    }

    /// Same contract with a different expiry, re-validated.
    pub fn with_expiry(&self, expiry: f64) -> PricingResult<Self> {
        Self::new(self.strike, expiry, self.option_type, self.style)
    }

    /// Same contract with a different exercise style.
    pub fn with_style(&self, style: ExerciseStyle) -> Self {
        Self { style, ..*self }
    }

    /// Immediate-exercise value at `spot`.
    #[inline]
    pub fn payoff(&self, spot: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (spot - self.strike).max(0.0),
            OptionType::Put => (self.strike - spot).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoffs() {
        let call = VanillaOption::european(100.0, 1.0, OptionType::Call).unwrap();
        let put = VanillaOption::american(100.0, 1.0, OptionType::Put).unwrap();

        assert_eq!(call.payoff(110.0), 10.0);
        assert_eq!(call.payoff(90.0), 0.0);
        assert_eq!(put.payoff(90.0), 10.0);
        assert_eq!(put.payoff(110.0), 0.0);
        assert_eq!(put.payoff(100.0), 0.0);
    }

    #[test]
    fn test_construction_validation() {
        assert!(VanillaOption::european(0.0, 1.0, OptionType::Call).is_err());
        assert!(VanillaOption::european(-5.0, 1.0, OptionType::Call).is_err());
        assert!(VanillaOption::european(100.0, 0.0, OptionType::Put).is_err());
        assert!(VanillaOption::european(f64::NAN, 1.0, OptionType::Put).is_err());
        assert!(VanillaOption::european(100.0, f64::INFINITY, OptionType::Put).is_err());
    }

    #[test]
    fn test_with_expiry_revalidates() {
        let put = VanillaOption::american(110.0, 1.0, OptionType::Put).unwrap();
        let shorter = put.with_expiry(0.5).unwrap();
        assert_eq!(shorter.expiry(), 0.5);
        assert_eq!(shorter.strike(), 110.0);
        assert_eq!(shorter.style(), ExerciseStyle::American);
        assert!(put.with_expiry(-0.1).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(OptionType::Put.to_string(), "PUT");
        assert_eq!(ExerciseStyle::American.to_string(), "AMERICAN");
    }
}
