// src/rng.rs
//! Random Number Generation for Monte Carlo Simulations
//!
//! # Design
//!
//! Draw order determines reproducibility, so every stream is an explicit
//! value owned by whoever simulates with it. Nothing here is global.
//!
//! - [`RandomStream`]: a seeded sequential stream. Reseeding is an explicit
//!   call, and each draw advances the stream's position.
//! - [`StreamFactory`]: maps `(seed, path_id)` to an independent stream so
//!   paths can be simulated on any number of threads with identical output.
//!
//! # Stream Splitting
//!
//! Per-path seeds are derived with a splitmix64 finaliser:
//! ```text
//! z = base_seed + path_id * 0x9e3779b97f4a7c15
//! z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
//! z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
//! seed = z ⊕ (z >> 31)
//! ```
//! which keeps neighbouring base seeds from sharing path streams.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Seeded pseudo-random stream of uniform and standard-normal draws.
#[derive(Debug, Clone)]
pub struct RandomStream {
    inner: StdRng,
    seed: u64,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the stream was last (re)initialised with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from the beginning of `seed`'s sequence.
    ///
    /// This is the only way a stream's position moves other than drawing.
    pub fn reseed(&mut self, seed: u64) {
        self.inner = StdRng::seed_from_u64(seed);
        self.seed = seed;
    }

    pub fn next_normal(&mut self) -> f64 {
        StandardNormal.sample(&mut self.inner)
    }

    /// Uniform draw on [0, 1).
    pub fn next_uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    pub fn normal_vector(&mut self, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.next_normal()).collect()
    }

    /// Pair of standard normals with correlation `rho`:
    /// ```text
    /// w₁ = z₁
    /// w₂ = ρ z₁ + √(1 - ρ²) z₂
    /// ```
    /// `rho` is clamped to [-1, 1].
    pub fn correlated_normals(&mut self, rho: f64) -> (f64, f64) {
        let rho = rho.clamp(-1.0, 1.0);
        let z1 = self.next_normal();
        let z2 = self.next_normal();
        (z1, rho * z1 + (1.0 - rho * rho).sqrt() * z2)
    }
}

/// Stream factory for reproducible parallel simulations
#[derive(Debug, Clone, Copy)]
pub struct StreamFactory {
    base_seed: u64,
}

impl StreamFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Independent stream for a specific path or worker.
    pub fn stream(&self, path_id: u64) -> RandomStream {
        RandomStream::new(split_seed(self.base_seed, path_id))
    }
}

fn split_seed(base_seed: u64, path_id: u64) -> u64 {
    let mut z = base_seed.wrapping_add(path_id.wrapping_mul(0x9e3779b97f4a7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}
