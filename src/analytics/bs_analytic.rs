// src/analytics/bs_analytic.rs
//! Closed-form Black-Scholes-Merton prices for European options
//!
//! # Mathematical Foundation
//!
//! With continuous dividend yield `q`:
//! ```text
//! C = S e^(-qT) Φ(d₁) - K e^(-rT) Φ(d₂)
//! P = K e^(-rT) Φ(-d₂) - S e^(-qT) Φ(-d₁)
//! d₁ = [ln(S/K) + (r - q + σ²/2)T] / (σ√T),   d₂ = d₁ - σ√T
//! ```
//!
//! These are reference values for the lattice and LSMC engines: lattice
//! convergence, and the American/European comparison where early exercise
//! is worthless.

use crate::market::MarketData;
use crate::math_utils::norm_cdf;
use crate::option::{OptionType, VanillaOption};

fn d1_d2(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> (f64, f64) {
    let vol_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / vol_sqrt_t;
    (d1, d1 - vol_sqrt_t)
}

/// Black-Scholes-Merton European call price
pub fn bs_call_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    s * (-q * t).exp() * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes-Merton European put price
pub fn bs_put_price(s: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, q, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2) - s * (-q * t).exp() * norm_cdf(-d1)
}

/// European price of `option`'s payoff, ignoring its exercise style.
pub fn european_price(option: &VanillaOption, market: &MarketData) -> f64 {
    let args = (
        market.spot(),
        option.strike(),
        market.rate(),
        market.dividend(),
        market.volatility(),
        option.expiry(),
    );
    match option.option_type() {
        OptionType::Call => bs_call_price(args.0, args.1, args.2, args.3, args.4, args.5),
        OptionType::Put => bs_put_price(args.0, args.1, args.2, args.3, args.4, args.5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_call() {
        // Hull: S=K=100, r=5%, σ=20%, T=1
        assert_abs_diff_eq!(bs_call_price(100.0, 100.0, 0.05, 0.0, 0.2, 1.0), 10.450584, epsilon = 1e-5);
    }

    #[test]
    fn test_put_call_parity_with_dividends() {
        let (s, k, r, q, sigma, t) = (100.0, 95.0, 0.04, 0.02, 0.3, 0.75);
        let call = bs_call_price(s, k, r, q, sigma, t);
        let put = bs_put_price(s, k, r, q, sigma, t);
        let parity = s * (-q * t).exp() - k * (-r * t as f64).exp();
        assert_abs_diff_eq!(call - put, parity, epsilon = 1e-10);
    }
}
