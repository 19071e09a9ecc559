// src/greeks.rs
//! Finite-difference sensitivities for any [`PricingEngine`]
//!
//! # Bumps
//!
//! | Greek | Bump                      | Difference |
//! |-------|---------------------------|------------|
//! | Δ     | spot × (1 ± h_S)          | central    |
//! | Γ     | spot × (1 ± h_S)          | central    |
//! | ν     | σ + h_σ                   | forward    |
//! | Θ     | expiry - h_T              | forward    |
//! | ρ     | r + h_r                   | forward    |
//!
//! ```text
//! Δ = (V(S+δ) - V(S-δ)) / 2δ,        δ = S·h_S
//! Γ = (V(S+δ) - 2V(S) + V(S-δ)) / δ²
//! Θ = (V(T-h_T) - V(T)) / h_T
//! ```
//! Theta is reported per year of calendar decay.

use crate::engine::PricingEngine;
use crate::error::{validation::*, PricingResult};
use crate::market::MarketData;
use crate::option::VanillaOption;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

bitflags! {
    /// Which sensitivities to compute; unselected fields stay zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GreeksConfig: u32 {
        const NONE  = 0;
        const DELTA = 1 << 0;
        const GAMMA = 1 << 1;
        const VEGA  = 1 << 2;
        const THETA = 1 << 3;
        const RHO   = 1 << 4;
        const ALL   = Self::DELTA.bits()
            | Self::GAMMA.bits()
            | Self::VEGA.bits()
            | Self::THETA.bits()
            | Self::RHO.bits();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

impl fmt::Display for Greeks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "delta={:.6} gamma={:.6} vega={:.6} theta={:.6} rho={:.6}",
            self.delta, self.gamma, self.vega, self.theta, self.rho
        )
    }
}

/// Bump sizes. `spot` is relative, the rest are absolute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BumpConfig {
    pub spot: f64,
    pub volatility: f64,
    pub rate: f64,
    /// Expiry reduction in years.
    pub time: f64,
}

impl BumpConfig {
    pub fn validate(&self) -> PricingResult<()> {
        validate_range("spot bump", self.spot, f64::MIN_POSITIVE, 0.5)?;
        validate_positive_finite("volatility bump", self.volatility)?;
        validate_positive_finite("rate bump", self.rate)?;
        validate_positive_finite("time bump", self.time)
    }
}

impl Default for BumpConfig {
    fn default() -> Self {
        BumpConfig {
            spot: 0.01,
            volatility: 0.001,
            rate: 0.0001,
            time: 1.0 / 365.0,
        }
    }
}

/// Bump-and-reprice sensitivities.
///
/// The theta bump builds a shorter-dated contract, so an expiry at or
/// below `bumps.time` fails contract validation when THETA is selected.
pub fn numerical_greeks<E>(
    engine: &E,
    option: &VanillaOption,
    market: &MarketData,
    bumps: &BumpConfig,
    which: GreeksConfig,
) -> PricingResult<Greeks>
where
    E: PricingEngine + ?Sized,
{
    bumps.validate()?;
    let mut greeks = Greeks::default();
    if which.is_empty() {
        return Ok(greeks);
    }

    let base = engine.price(option, market)?;

    if which.intersects(GreeksConfig::DELTA | GreeksConfig::GAMMA) {
        let h = market.spot() * bumps.spot;
        let up = engine.price(option, &market.with_spot(market.spot() + h)?)?;
        let down = engine.price(option, &market.with_spot(market.spot() - h)?)?;
        if which.contains(GreeksConfig::DELTA) {
            greeks.delta = (up - down) / (2.0 * h);
        }
        if which.contains(GreeksConfig::GAMMA) {
            greeks.gamma = (up - 2.0 * base + down) / (h * h);
        }
    }

    if which.contains(GreeksConfig::VEGA) {
        let bumped = market.with_volatility(market.volatility() + bumps.volatility)?;
        greeks.vega = (engine.price(option, &bumped)? - base) / bumps.volatility;
    }

    if which.contains(GreeksConfig::THETA) {
        let shorter = option.with_expiry(option.expiry() - bumps.time)?;
        greeks.theta = (engine.price(&shorter, market)? - base) / bumps.time;
    }

    if which.contains(GreeksConfig::RHO) {
        let bumped = market.with_rate(market.rate() + bumps.rate)?;
        greeks.rho = (engine.price(option, &bumped)? - base) / bumps.rate;
    }

    debug!(engine = engine.name(), %greeks, "finite-difference greeks");
    Ok(greeks)
}
