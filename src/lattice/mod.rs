//! Recombining lattices with backward induction
//!
//! Both engines keep a single node-value buffer for the current time slice
//! and overwrite it as induction walks back to the root. European style
//! discounts the expected continuation at each node; American style takes
//! `max(continuation, payoff(node spot))` instead.

pub mod binomial;
pub mod trinomial;

pub use binomial::{BinomialEngine, CrrParameters};
pub use trinomial::{TrinomialEngine, TrinomialParameters};

use crate::error::{validation::*, PricingError, PricingResult};
use serde::{Deserialize, Serialize};

/// Lattice depth shared by the binomial and trinomial engines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub steps: usize,
}

impl LatticeConfig {
    pub fn validate(&self) -> PricingResult<()> {
        validate_steps("steps", self.steps)
    }
}

impl Default for LatticeConfig {
    fn default() -> Self {
        LatticeConfig { steps: 100 }
    }
}

/// Branch probabilities must be usable as-is; they are never clamped.
pub(crate) fn check_probability(lattice: &str, branch: &str, value: f64) -> PricingResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(PricingError::InvalidProbability {
            lattice: lattice.to_string(),
            branch: branch.to_string(),
            value,
        });
    }
    Ok(())
}
