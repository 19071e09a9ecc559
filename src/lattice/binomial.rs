// src/lattice/binomial.rs
//! Cox-Ross-Rubinstein binomial tree
//!
//! # Parameterisation
//! ```text
//! Δt = T/N,   u = exp(σ√Δt),   d = 1/u
//! p  = (exp((r - q)Δt) - d) / (u - d)
//! df = exp(-rΔt)
//! ```
//! Node `i` of slice `n` (counting down-moves) sits at `S·u^(n-i)·d^i`.
//!
//! # Backward Induction
//! ```text
//! V[i] = df·(p·V[i] + (1-p)·V[i+1])                       European
//! V[i] = max(df·(p·V[i] + (1-p)·V[i+1]), payoff(S_node))  American
//! ```
//! Walking `i` upward, `V[i+1]` is still the later slice's value when
//! `V[i]` is overwritten, so one buffer of `N+1` values is enough.

use super::{check_probability, LatticeConfig};
use crate::engine::PricingEngine;
use crate::error::{validation::*, PricingResult};
use crate::market::MarketData;
use crate::option::{ExerciseStyle, VanillaOption};
use tracing::debug;

/// CRR tree parameters for one (market, expiry, steps) combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrrParameters {
    pub dt: f64,
    pub u: f64,
    pub d: f64,
    /// Risk-neutral up-probability.
    pub p: f64,
    /// Per-step discount factor.
    pub df: f64,
}

impl CrrParameters {
    /// Fails with `InvalidProbability` when `p` falls outside [0, 1], which
    /// happens when `|r - q|·Δt` is large relative to `σ√Δt`.
    pub fn new(market: &MarketData, expiry: f64, steps: usize) -> PricingResult<Self> {
        validate_positive_finite("expiry", expiry)?;
        validate_steps("steps", steps)?;

        let dt = expiry / steps as f64;
        let u = (market.volatility() * dt.sqrt()).exp();
        let d = 1.0 / u;
        let growth = ((market.rate() - market.dividend()) * dt).exp();
        let p = (growth - d) / (u - d);
        check_probability("binomial", "p", p)?;

        Ok(CrrParameters {
            dt,
            u,
            d,
            p,
            df: (-market.rate() * dt).exp(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BinomialEngine {
    steps: usize,
}

impl BinomialEngine {
    pub fn new(steps: usize) -> PricingResult<Self> {
        Self::from_config(&LatticeConfig { steps })
    }

    pub fn from_config(config: &LatticeConfig) -> PricingResult<Self> {
        config.validate()?;
        Ok(BinomialEngine {
            steps: config.steps,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        let params = CrrParameters::new(market, option.expiry(), self.steps)?;
        let n = self.steps;
        let spot = market.spot();
        let american = option.style() == ExerciseStyle::American;
        let node_spot = |step: usize, i: usize| spot * params.u.powi(step as i32 - 2 * i as i32);

        let mut values: Vec<f64> = (0..=n).map(|i| option.payoff(node_spot(n, i))).collect();

        let (p, q, df) = (params.p, 1.0 - params.p, params.df);
        for step in (0..n).rev() {
            for i in 0..=step {
                let continuation = df * (p * values[i] + q * values[i + 1]);
                values[i] = if american {
                    continuation.max(option.payoff(node_spot(step, i)))
                } else {
                    continuation
                };
            }
        }

        debug!(
            steps = n,
            style = %option.style(),
            p = params.p,
            price = values[0],
            "binomial price"
        );
        Ok(values[0])
    }
}

impl PricingEngine for BinomialEngine {
    fn name(&self) -> &'static str {
        "Binomial CRR"
    }

    fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        BinomialEngine::price(self, option, market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::option::OptionType;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_crr_parameters() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let params = CrrParameters::new(&m, 1.0, 4).unwrap();

        assert_abs_diff_eq!(params.dt, 0.25);
        assert_abs_diff_eq!(params.u * params.d, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(params.u, (0.1_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(params.df, (-0.0125_f64).exp(), epsilon = 1e-15);
        // risk-neutral drift reproduced by the one-step expectation
        let growth = params.p * params.u + (1.0 - params.p) * params.d;
        assert_abs_diff_eq!(growth, (0.0125_f64).exp(), epsilon = 1e-14);
    }

    #[test]
    fn test_one_step_tree_by_hand() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let call = VanillaOption::european(100.0, 1.0, OptionType::Call).unwrap();
        let params = CrrParameters::new(&m, 1.0, 1).unwrap();

        let up_payoff = 100.0 * params.u - 100.0;
        let expected = params.df * params.p * up_payoff;
        let price = BinomialEngine::new(1).unwrap().price(&call, &m).unwrap();
        assert_abs_diff_eq!(price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_probability_outside_unit_interval_fails() {
        // drift far larger than one step's volatility
        let m = MarketData::new(100.0, 0.9, 0.01, 0.0).unwrap();
        let put = VanillaOption::american(100.0, 1.0, OptionType::Put).unwrap();

        let result = BinomialEngine::new(10).unwrap().price(&put, &m);
        assert!(matches!(result, Err(PricingError::InvalidProbability { .. })));
    }

    #[test]
    fn test_american_put_early_exercise_premium() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let engine = BinomialEngine::new(200).unwrap();
        let american = VanillaOption::american(110.0, 1.0, OptionType::Put).unwrap();
        let european = american.with_style(ExerciseStyle::European);

        let a = engine.price(&american, &m).unwrap();
        let e = engine.price(&european, &m).unwrap();
        assert!(a > e + 0.1, "American {} should carry a premium over European {}", a, e);
        assert!(a >= 10.0 - 1e-9);
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert!(BinomialEngine::new(0).is_err());
    }
}
