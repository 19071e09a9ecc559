// src/market.rs
use crate::error::{validation::*, PricingResult};
use serde::{Deserialize, Serialize};

/// Flat market snapshot for a single underlying.
///
/// Rates and dividend yield are continuously compounded, volatility is
/// annualised. Construction validates every field, and the `with_*`
/// helpers return validated copies for finite-difference bumps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    spot: f64,
    rate: f64,
    volatility: f64,
    dividend: f64,
}

impl MarketData {
    pub fn new(spot: f64, rate: f64, volatility: f64, dividend: f64) -> PricingResult<Self> {
        validate_positive_finite("spot", spot)?;
        validate_finite("rate", rate)?;
        validate_positive_finite("volatility", volatility)?;
        validate_finite("dividend", dividend)?;
        Ok(Self {
            spot,
            rate,
            volatility,
            dividend,
        })
    }

    pub fn spot(&self) -> f64 {
        self.spot
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn dividend(&self) -> f64 {
        self.dividend
    }

    pub fn with_spot(&self, spot: f64) -> PricingResult<Self> {
        Self::new(spot, self.rate, self.volatility, self.dividend)
    }

    pub fn with_rate(&self, rate: f64) -> PricingResult<Self> {
        Self::new(self.spot, rate, self.volatility, self.dividend)
    }

    pub fn with_volatility(&self, volatility: f64) -> PricingResult<Self> {
        Self::new(self.spot, self.rate, volatility, self.dividend)
    }

    pub fn with_dividend(&self, dividend: f64) -> PricingResult<Self> {
        Self::new(self.spot, self.rate, self.volatility, dividend)
    }
}
