//! # early-exercise: American Option Pricing
//!
//! A Rust library for pricing American-style equity options under
//! geometric Brownian motion, with lattice and least-squares Monte Carlo
//! engines behind one pricing interface.
//!
//! ## Key Features
//!
//! - **Lattice Engines**: Cox-Ross-Rubinstein binomial and moment-matched trinomial trees
//! - **Least-Squares Monte Carlo**: Longstaff-Schwartz with Laguerre regression
//! - **Parallel Simulation**: Rayon path generation, reproducible for a fixed seed
//! - **Variance Reduction**: Antithetic variates
//! - **Greeks**: Delta, Gamma, Vega, Theta, Rho by bump-and-reprice on any engine
//! - **Validated Inputs**: Every constructor returns a `PricingResult`
//!
//! ## Quick Start
//!
//! ```rust
//! use early_exercise::{BinomialEngine, MarketData, OptionType, PricingEngine, VanillaOption};
//!
//! let put = VanillaOption::american(100.0, 1.0, OptionType::Put).expect("valid contract");
//! let market = MarketData::new(100.0, 0.05, 0.2, 0.0).expect("valid market");
//!
//! let engine = BinomialEngine::new(200).expect("valid steps");
//! let price = engine.price(&put, &market).expect("pricing succeeds");
//! let greeks = engine.greeks(&put, &market).expect("greeks succeed");
//! println!("price {:.4}, {}", price, greeks);
//! ```
//!
//! ## Mathematical Foundation
//!
//! Under the risk-neutral measure the spot follows
//! `dS = (r - q) S dt + σ S dW`. An American option's value is the
//! supremum over stopping times of the discounted payoff; the lattices
//! solve the optimal-stopping problem by backward induction on a
//! recombining grid, and LSMC approximates the continuation value with a
//! cross-sectional least-squares regression on simulated paths.

pub mod error;
pub mod rng;
pub mod math_utils;
pub mod linalg;
pub mod option;
pub mod market;
pub mod models;
pub mod mc;
pub mod lattice;
pub mod engine;
pub mod greeks;
pub mod analytics;
pub mod output;

pub use engine::PricingEngine;
pub use error::{PricingError, PricingResult};
pub use greeks::{numerical_greeks, BumpConfig, Greeks, GreeksConfig};
pub use lattice::{BinomialEngine, LatticeConfig, TrinomialEngine};
pub use market::MarketData;
pub use mc::lsmc::{LsmcConfig, LsmcEngine, LsmcOutcome};
pub use option::{ExerciseStyle, OptionType, VanillaOption};
