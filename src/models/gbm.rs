// src/models/gbm.rs
//! Geometric Brownian Motion path simulation
//!
//! # Math Framework
//!
//! Under the risk-neutral measure with continuous dividend yield `q`:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//! Each step uses the exact lognormal transition, so there is no
//! discretisation bias and paths stay strictly positive:
//! ```text
//! S_{i+1} = S_i * exp((r - q - σ²/2)Δt + σ√Δt * Z_i),   Z_i ~ N(0,1)
//! ```
//!
//! # Antithetic Variates
//!
//! The mirror of a primary path reuses the primary's draws negated
//! (`-Z_i` at every step). Both paths are exact samples of the same law,
//! so the pair average stays unbiased while its variance drops for
//! monotone payoffs.

use crate::error::{validation::*, PricingResult};
use crate::market::MarketData;
use crate::rng::{RandomStream, StreamFactory};
use rayon::prelude::*;
use std::ops::Deref;

/// Simulated spot prices at times `0, Δt, ..., N·Δt`.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePath(Vec<f64>);

impl PricePath {
    /// Number of time steps (one less than the number of observations).
    pub fn steps(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn terminal(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for PricePath {
    fn from(values: Vec<f64>) -> Self {
        PricePath(values)
    }
}

impl Deref for PricePath {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Exact GBM simulator for a fixed market, horizon and step count.
#[derive(Debug, Clone, Copy)]
pub struct PathSimulator {
    steps: usize,
    dt: f64,
    drift: f64,
    diffusion: f64,
}

impl PathSimulator {
    pub fn new(market: &MarketData, horizon: f64, steps: usize) -> PricingResult<Self> {
        validate_positive_finite("horizon", horizon)?;
        validate_steps("steps", steps)?;

        let dt = horizon / steps as f64;
        let sigma = market.volatility();
        Ok(PathSimulator {
            steps,
            dt,
            drift: (market.rate() - market.dividend() - 0.5 * sigma * sigma) * dt,
            diffusion: sigma * dt.sqrt(),
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    #[inline]
    pub fn exact_step(&self, s_t: f64, normal_draw: f64) -> f64 {
        s_t * (self.drift + self.diffusion * normal_draw).exp()
    }

    /// One path of `steps + 1` observations starting exactly at `spot0`.
    pub fn simulate(&self, spot0: f64, stream: &mut RandomStream) -> PricePath {
        let mut path = Vec::with_capacity(self.steps + 1);
        path.push(spot0);

        let mut current_s = spot0;
        for _ in 0..self.steps {
            current_s = self.exact_step(current_s, stream.next_normal());
            path.push(current_s);
        }
        PricePath(path)
    }

    /// Primary path and its mirror, driven by `Z` and `-Z` respectively.
    pub fn simulate_antithetic(&self, spot0: f64, stream: &mut RandomStream) -> (PricePath, PricePath) {
        let mut primary = Vec::with_capacity(self.steps + 1);
        let mut mirror = Vec::with_capacity(self.steps + 1);
        primary.push(spot0);
        mirror.push(spot0);

        let (mut s, mut s_bar) = (spot0, spot0);
        for _ in 0..self.steps {
            let z = stream.next_normal();
            s = self.exact_step(s, z);
            s_bar = self.exact_step(s_bar, -z);
            primary.push(s);
            mirror.push(s_bar);
        }
        (PricePath(primary), PricePath(mirror))
    }

    /// `num_paths` paths from one sequential stream, advancing it.
    ///
    /// With `antithetic` the output alternates primary, mirror, primary,
    /// mirror...; an odd count ends with an unpaired primary path.
    pub fn simulate_batch_with_stream(
        &self,
        spot0: f64,
        num_paths: usize,
        antithetic: bool,
        stream: &mut RandomStream,
    ) -> Vec<PricePath> {
        let mut paths = Vec::with_capacity(num_paths);
        if antithetic {
            for _ in 0..num_paths / 2 {
                let (primary, mirror) = self.simulate_antithetic(spot0, stream);
                paths.push(primary);
                paths.push(mirror);
            }
            if num_paths % 2 == 1 {
                paths.push(self.simulate(spot0, stream));
            }
        } else {
            for _ in 0..num_paths {
                paths.push(self.simulate(spot0, stream));
            }
        }
        paths
    }

    /// Parallel batch with the same layout as [`Self::simulate_batch_with_stream`].
    ///
    /// Primary path `i` (or pair `i`) draws from `factory.stream(i)`, so the
    /// result is identical for any rayon thread count.
    pub fn simulate_batch(
        &self,
        spot0: f64,
        num_paths: usize,
        antithetic: bool,
        factory: &StreamFactory,
    ) -> Vec<PricePath> {
        if !antithetic {
            return (0..num_paths)
                .into_par_iter()
                .map(|i| self.simulate(spot0, &mut factory.stream(i as u64)))
                .collect();
        }

        let pairs = num_paths / 2;
        let mut paths: Vec<PricePath> = (0..pairs)
            .into_par_iter()
            .flat_map_iter(|i| {
                let (primary, mirror) = self.simulate_antithetic(spot0, &mut factory.stream(i as u64));
                [primary, mirror]
            })
            .collect();

        if num_paths % 2 == 1 {
            paths.push(self.simulate(spot0, &mut factory.stream(pairs as u64)));
        }
        paths
    }
}
