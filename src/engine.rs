// src/engine.rs
use crate::error::PricingResult;
use crate::greeks::{numerical_greeks, BumpConfig, Greeks, GreeksConfig};
use crate::market::MarketData;
use crate::option::VanillaOption;

/// Common interface of the lattice and Monte Carlo engines.
///
/// `price` must behave as a pure function of `(option, market)`; the
/// default `greeks` re-prices bumped inputs and relies on that.
pub trait PricingEngine {
    fn name(&self) -> &'static str;

    fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64>;

    fn greeks(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<Greeks> {
        numerical_greeks(self, option, market, &BumpConfig::default(), GreeksConfig::ALL)
    }
}
