// src/mc/lsmc.rs
//! Longstaff-Schwartz least-squares Monte Carlo for American options
//!
//! # Algorithm
//!
//! 1. Simulate `N` GBM paths over `M` steps to expiry.
//! 2. Seed each path's cash-flow schedule with its terminal payoff.
//! 3. For `t = M-1, ..., 1`:
//!    - take the in-the-money paths at `t` (immediate payoff > 0);
//!    - regress each one's *realised* discounted future cash flow on its
//!      spot (standardised over that step's in-the-money set), giving a
//!      continuation-value estimate;
//!    - exercise where the payoff strictly beats the estimate, which
//!      overwrites the schedule from `t` onward.
//! 4. Price = mean over paths of the single cash flow discounted to 0,
//!    or the immediate payoff at step 0 if that is larger.
//!
//! # Look-ahead Bias
//!
//! Regression targets are always cash flows the schedule has already
//! committed to, never another regression's output. The estimate only
//! decides *whether* to exercise; the value credited to a path is what it
//! actually realises along its own future.
//!
//! Step 0 is the valuation date and never enters the decision loop.

use crate::engine::PricingEngine;
use crate::error::{validation::*, PricingError, PricingResult};
use crate::market::MarketData;
use crate::mc::regression::{self, RegressionCoefficients};
use crate::models::gbm::{PathSimulator, PricePath};
use crate::option::{ExerciseStyle, VanillaOption};
use crate::rng::{RandomStream, StreamFactory};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// LSMC engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsmcConfig {
    pub num_paths: usize,
    pub num_timesteps: usize,
    pub seed: u64,
    pub use_antithetic: bool,
    /// Highest Laguerre degree in the continuation-value regression.
    pub polynomial_degree: usize,
}

impl LsmcConfig {
    pub fn validate(&self) -> PricingResult<()> {
        validate_paths(self.num_paths)?;
        validate_steps("num_timesteps", self.num_timesteps)?;
        if self.polynomial_degree > 10 {
            return Err(PricingError::InvalidConfiguration {
                field: "polynomial_degree".to_string(),
                reason: format!(
                    "{} is too high for a normal-equations fit (max 10)",
                    self.polynomial_degree
                ),
            });
        }
        Ok(())
    }
}

impl Default for LsmcConfig {
    fn default() -> Self {
        LsmcConfig {
            num_paths: 50_000,
            num_timesteps: 50,
            seed: 12345,
            use_antithetic: true,
            polynomial_degree: 3,
        }
    }
}

/// Per-path, per-step realised cash flows (undiscounted).
///
/// Each path holds at most one non-zero entry. [`Self::exercise`] keeps
/// that true by clearing every later entry of the path it writes to.
#[derive(Debug, Clone, PartialEq)]
pub struct CashFlowSchedule {
    steps: usize,
    flows: Vec<f64>,
}

impl CashFlowSchedule {
    /// Schedule with `terminal[i]` at step `steps` of path `i`, zero elsewhere.
    pub fn new(terminal: &[f64], steps: usize) -> Self {
        let stride = steps + 1;
        let mut flows = vec![0.0; terminal.len() * stride];
        for (i, &payoff) in terminal.iter().enumerate() {
            flows[i * stride + steps] = payoff;
        }
        CashFlowSchedule { steps, flows }
    }

    pub fn num_paths(&self) -> usize {
        self.flows.len() / (self.steps + 1)
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Cash flows of one path, indexed by time step.
    pub fn row(&self, path: usize) -> &[f64] {
        let stride = self.steps + 1;
        &self.flows[path * stride..(path + 1) * stride]
    }

    /// Commit `path` to exercising at `t` for `value`.
    pub fn exercise(&mut self, path: usize, t: usize, value: f64) {
        let stride = self.steps + 1;
        let row = &mut self.flows[path * stride..(path + 1) * stride];
        row[t] = value;
        row[t + 1..].iter_mut().for_each(|cf| *cf = 0.0);
    }

    /// First non-zero cash flow of `path` and its step.
    pub fn first_cash_flow(&self, path: usize) -> Option<(usize, f64)> {
        self.first_cash_flow_from(path, 0)
    }

    fn first_cash_flow_from(&self, path: usize, from: usize) -> Option<(usize, f64)> {
        self.row(path)
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, &cf)| cf != 0.0)
            .map(|(j, &cf)| (j, cf))
    }

    /// Realised cash flow strictly after `t`, discounted back to `t`.
    ///
    /// `r_dt` is the per-step log discount `r·Δt`.
    pub fn realized_after(&self, path: usize, t: usize, r_dt: f64) -> f64 {
        self.first_cash_flow_from(path, t + 1)
            .map(|(j, cf)| cf * (-r_dt * (j - t) as f64).exp())
            .unwrap_or(0.0)
    }

    /// The path's cash flow discounted to the valuation date.
    pub fn discounted_value(&self, path: usize, r_dt: f64) -> f64 {
        self.first_cash_flow(path)
            .map(|(j, cf)| cf * (-r_dt * j as f64).exp())
            .unwrap_or(0.0)
    }
}

/// Diagnostics for one backward time step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub step: usize,
    pub itm_paths: usize,
    pub exercised_paths: usize,
    /// `None` when too few paths were in the money to regress.
    pub coefficients: Option<RegressionCoefficients>,
}

/// Full LSMC result.
#[derive(Debug, Clone)]
pub struct LsmcOutcome {
    /// `max(continuation_value, payoff(spot))`: the holder may also
    /// exercise on the valuation date, so this can exceed the schedule mean.
    pub price: f64,
    /// Mean over paths of the schedule's discounted cash flow.
    pub continuation_value: f64,
    /// Monte Carlo standard error of `continuation_value` (antithetic pairs
    /// averaged first).
    pub std_error: f64,
    /// Share of paths exercised before expiry.
    pub early_exercise_fraction: f64,
    /// Step diagnostics in chronological order, `t = 1..M-1`.
    pub steps: Vec<StepReport>,
    pub schedule: CashFlowSchedule,
}

/// Longstaff-Schwartz engine. `price` is a pure function of its inputs:
/// every call rebuilds its random streams from `config.seed`.
#[derive(Debug, Clone)]
pub struct LsmcEngine {
    config: LsmcConfig,
}

impl LsmcEngine {
    pub fn new(config: LsmcConfig) -> PricingResult<Self> {
        config.validate()?;
        Ok(LsmcEngine { config })
    }

    pub fn config(&self) -> &LsmcConfig {
        &self.config
    }

    pub fn run(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<LsmcOutcome> {
        Self::require_american(option)?;
        let sim = PathSimulator::new(market, option.expiry(), self.config.num_timesteps)?;
        debug!(
            num_paths = self.config.num_paths,
            num_timesteps = self.config.num_timesteps,
            seed = self.config.seed,
            antithetic = self.config.use_antithetic,
            "simulating LSMC paths"
        );
        let paths = sim.simulate_batch(
            market.spot(),
            self.config.num_paths,
            self.config.use_antithetic,
            &StreamFactory::new(self.config.seed),
        );
        self.backward_induction(option, market.rate(), sim.dt(), &paths, self.config.use_antithetic)
    }

    /// Like [`Self::run`] but draws sequentially from a caller-owned stream,
    /// leaving it advanced past every draw used.
    pub fn run_with_stream(
        &self,
        option: &VanillaOption,
        market: &MarketData,
        stream: &mut RandomStream,
    ) -> PricingResult<LsmcOutcome> {
        Self::require_american(option)?;
        let sim = PathSimulator::new(market, option.expiry(), self.config.num_timesteps)?;
        let paths = sim.simulate_batch_with_stream(
            market.spot(),
            self.config.num_paths,
            self.config.use_antithetic,
            stream,
        );
        self.backward_induction(option, market.rate(), sim.dt(), &paths, self.config.use_antithetic)
    }

    pub fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        self.run(option, market).map(|outcome| outcome.price)
    }

    pub fn price_with_stream(
        &self,
        option: &VanillaOption,
        market: &MarketData,
        stream: &mut RandomStream,
    ) -> PricingResult<f64> {
        self.run_with_stream(option, market, stream)
            .map(|outcome| outcome.price)
    }

    /// Backward induction over caller-supplied paths sampled every `dt`.
    ///
    /// Paths are treated as independent samples; `num_paths`,
    /// `num_timesteps` and `seed` from the config are not used.
    pub fn price_paths(
        &self,
        option: &VanillaOption,
        rate: f64,
        dt: f64,
        paths: &[PricePath],
    ) -> PricingResult<LsmcOutcome> {
        Self::require_american(option)?;
        validate_finite("rate", rate)?;
        validate_positive_finite("dt", dt)?;
        let first = paths.first().ok_or_else(|| PricingError::InvalidConfiguration {
            field: "paths".to_string(),
            reason: "at least one path is required".to_string(),
        })?;
        let len = first.len();
        if len < 2 {
            return Err(PricingError::InvalidConfiguration {
                field: "paths".to_string(),
                reason: "paths need at least one time step".to_string(),
            });
        }
        if let Some(bad) = paths.iter().find(|p| p.len() != len) {
            return Err(PricingError::DimensionMismatch {
                context: "path length".to_string(),
                expected: len,
                actual: bad.len(),
            });
        }
        self.backward_induction(option, rate, dt, paths, false)
    }

    fn require_american(option: &VanillaOption) -> PricingResult<()> {
        if option.style() != ExerciseStyle::American {
            return Err(PricingError::StyleMismatch {
                engine: "LSMC".to_string(),
                style: option.style().to_string(),
            });
        }
        Ok(())
    }

    fn backward_induction(
        &self,
        option: &VanillaOption,
        rate: f64,
        dt: f64,
        paths: &[PricePath],
        antithetic: bool,
    ) -> PricingResult<LsmcOutcome> {
        let steps = paths[0].steps();
        let r_dt = rate * dt;
        let degree = self.config.polynomial_degree;

        let terminal: Vec<f64> = paths.iter().map(|p| option.payoff(p[steps])).collect();
        let mut schedule = CashFlowSchedule::new(&terminal, steps);

        let mut reports = Vec::with_capacity(steps.saturating_sub(1));
        for t in (1..steps).rev() {
            reports.push(exercise_step(option, paths, &mut schedule, t, r_dt, degree)?);
        }
        reports.reverse();

        let values: Vec<f64> = (0..paths.len())
            .map(|i| schedule.discounted_value(i, r_dt))
            .collect();
        let continuation = values.iter().sum::<f64>() / values.len() as f64;
        let std_error = standard_error(&values, if antithetic { 2 } else { 1 });

        if !continuation.is_finite() {
            return Err(PricingError::NumericalInstability {
                method: "LSMC".to_string(),
                reason: format!("price estimate is not finite: {}", continuation),
            });
        }

        // holder may exercise on the valuation date itself
        let immediate = option.payoff(paths[0][0]);
        if immediate > continuation {
            debug!(immediate, continuation, "immediate exercise dominates");
        }
        let price = continuation.max(immediate);

        let early = (0..paths.len())
            .filter(|&i| matches!(schedule.first_cash_flow(i), Some((j, _)) if j < steps))
            .count();
        let early_exercise_fraction = early as f64 / paths.len() as f64;

        debug!(price, std_error, early_exercise_fraction, "LSMC price");
        Ok(LsmcOutcome {
            price,
            continuation_value: continuation,
            std_error,
            early_exercise_fraction,
            steps: reports,
            schedule,
        })
    }
}

/// Exercise decisions for every in-the-money path at step `t`.
fn exercise_step(
    option: &VanillaOption,
    paths: &[PricePath],
    schedule: &mut CashFlowSchedule,
    t: usize,
    r_dt: f64,
    degree: usize,
) -> PricingResult<StepReport> {
    let mut itm = Vec::new();
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for (i, path) in paths.iter().enumerate() {
        if option.payoff(path[t]) > 0.0 {
            itm.push(i);
            xs.push(path[t]);
            ys.push(schedule.realized_after(i, t, r_dt));
        }
    }

    if itm.len() < degree + 1 {
        debug!(step = t, itm_paths = itm.len(), "too few in-the-money paths, no exercise decisions");
        return Ok(StepReport {
            step: t,
            itm_paths: itm.len(),
            exercised_paths: 0,
            coefficients: None,
        });
    }

    let coefficients = regression::fit(&xs, &ys, degree)?;

    let mut exercised = 0;
    for (&i, &x) in itm.iter().zip(&xs) {
        let exercise_value = option.payoff(paths[i][t]);
        if exercise_value > coefficients.evaluate(x) {
            schedule.exercise(i, t, exercise_value);
            exercised += 1;
        }
    }

    trace!(step = t, itm_paths = itm.len(), exercised, "LSMC exercise step");
    Ok(StepReport {
        step: t,
        itm_paths: itm.len(),
        exercised_paths: exercised,
        coefficients: Some(coefficients),
    })
}

/// Standard error of the mean of `values`, averaging consecutive groups of
/// `group` first (antithetic pairs are not independent samples).
fn standard_error(values: &[f64], group: usize) -> f64 {
    let samples: Vec<f64> = values
        .chunks(group)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    (var / n as f64).sqrt()
}

impl PricingEngine for LsmcEngine {
    fn name(&self) -> &'static str {
        "LSMC"
    }

    fn price(&self, option: &VanillaOption, market: &MarketData) -> PricingResult<f64> {
        LsmcEngine::price(self, option, market)
    }
}
