// src/lattice/trinomial.rs
//! Moment-matched trinomial tree in log-spot
//!
//! # Parameterisation
//! ```text
//! Δx = σ√(3Δt),   ν = r - q - σ²/2,   a = (σ²Δt + ν²Δt²)/Δx²
//! p_u = (a + νΔt/Δx)/2,   p_m = 1 - a,   p_d = (a - νΔt/Δx)/2
//! ```
//! which matches the first two moments of the log-return per step.
//! Node `j ∈ [-n, n]` of slice `n` sits at `S·exp(jΔx)`.

use super::{check_probability, LatticeConfig};
use crate::engine::PricingEngine;
use crate::error::{validation::*, PricingResult};
use crate::market::MarketData;
use crate::option::{ExerciseStyle, VanillaOption};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrinomialParameters {
    pub dt: f64,
    pub dx: f64,
    pub pu: f64,
    pub pm: f64,
    pub pd: f64,
    pub df: f64,
}

impl TrinomialParameters {
    pub fn new(market: &MarketData, expiry: f64, steps: usize) -> PricingResult<Self> {
        validate_positive_finite("expiry", expiry)?;
        validate_steps("steps", steps)?;

        let sigma = market.volatility();
        let dt = expiry / steps as f64;
        let dx = sigma * (3.0 * dt).sqrt();
        let nu = market.rate() - market.dividend() - 0.5 * sigma * sigma;

        let a = (sigma * sigma * dt + nu * nu * dt * dt) / (dx * dx);
        let b = nu * dt / dx;
        let pu = 0.5 * (a + b);
        let pm = 1.0 - a;
        let pd = 0.5 * (a - b);

        check_probability("trinomial", "pu", pu)?;
        check_probability("trinomial", "pm", pm)?;
        check_probability("trinomial", "pd", pd)?;

        Ok(TrinomialParameters {
            dt,
            dx,
            pu,
            pm,
            pd,
            df: (-market.rate() * dt).exp(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrinomialEngine {
    steps: usize,
}

impl TrinomialEngine {
    pub fn new(steps: usize) -> PricingResult<Self> {
        Self::from_config(&LatticeConfig { steps })
    }

    pub fn from_config(config: &LatticeConfig) -> PricingResult<Self> {
        config.validate()?;
        Ok(TrinomialEngine {
            steps: config.steps,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        let params = TrinomialParameters::new(market, option.expiry(), self.steps)?;
        let n = self.steps;
        let spot = market.spot();
        let american = option.style() == ExerciseStyle::American;
        // buffer index k holds node j = k - n
        let node_spot = |k: usize| spot * ((k as f64 - n as f64) * params.dx).exp();

        let mut values: Vec<f64> = (0..=2 * n).map(|k| option.payoff(node_spot(k))).collect();

        let TrinomialParameters { pu, pm, pd, df, .. } = params;
        for step in (0..n).rev() {
            let (start, end) = (n - step, n + step);
            // later-slice value of the node below, saved before it is overwritten
            let mut below = values[start - 1];
            for k in start..=end {
                let middle = values[k];
                let continuation = df * (pu * values[k + 1] + pm * middle + pd * below);
                below = middle;
                values[k] = if american {
                    continuation.max(option.payoff(node_spot(k)))
                } else {
                    continuation
                };
            }
        }

        debug!(
            steps = n,
            style = %option.style(),
            pu,
            pm,
            pd,
            price = values[n],
            "trinomial price"
        );
        Ok(values[n])
    }
}

impl PricingEngine for TrinomialEngine {
    fn name(&self) -> &'static str {
        "Trinomial"
    }

    fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        TrinomialEngine::price(self, option, market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionType;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_probabilities_sum_to_one_and_match_moments() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.02).unwrap();
        let p = TrinomialParameters::new(&m, 1.0, 50).unwrap();

        assert_abs_diff_eq!(p.pu + p.pm + p.pd, 1.0, epsilon = 1e-14);
        let nu = 0.05 - 0.02 - 0.5 * 0.04;
        assert_abs_diff_eq!((p.pu - p.pd) * p.dx, nu * p.dt, epsilon = 1e-14);
        let second = (p.pu + p.pd) * p.dx * p.dx;
        assert_abs_diff_eq!(second, 0.04 * p.dt + nu * nu * p.dt * p.dt, epsilon = 1e-14);
    }

    #[test]
    fn test_one_step_tree_by_hand() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let put = VanillaOption::european(105.0, 0.5, OptionType::Put).unwrap();
        let p = TrinomialParameters::new(&m, 0.5, 1).unwrap();

        let up = put.payoff(100.0 * p.dx.exp());
        let mid = put.payoff(100.0);
        let down = put.payoff(100.0 * (-p.dx).exp());
        let expected = p.df * (p.pu * up + p.pm * mid + p.pd * down);

        let price = TrinomialEngine::new(1).unwrap().price(&put, &m).unwrap();
        assert_abs_diff_eq!(price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_two_step_tree_uses_later_slice_values() {
        let m = MarketData::new(100.0, 0.03, 0.25, 0.0).unwrap();
        let call = VanillaOption::european(100.0, 1.0, OptionType::Call).unwrap();
        let p = TrinomialParameters::new(&m, 1.0, 2).unwrap();

        let leaf = |j: i32| call.payoff(100.0 * (j as f64 * p.dx).exp());
        let node = |j: i32| p.df * (p.pu * leaf(j + 1) + p.pm * leaf(j) + p.pd * leaf(j - 1));
        let expected = p.df * (p.pu * node(1) + p.pm * node(0) + p.pd * node(-1));

        let price = TrinomialEngine::new(2).unwrap().price(&call, &m).unwrap();
        assert_abs_diff_eq!(price, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_american_at_least_european() {
        let m = MarketData::new(100.0, 0.05, 0.2, 0.0).unwrap();
        let engine = TrinomialEngine::new(150).unwrap();
        let american = VanillaOption::american(110.0, 1.0, OptionType::Put).unwrap();
        let european = american.with_style(ExerciseStyle::European);

        let a = engine.price(&american, &m).unwrap();
        let e = engine.price(&european, &m).unwrap();
        assert!(a >= e - 1e-9);
        assert!(a >= 10.0 - 1e-9);
    }
}
