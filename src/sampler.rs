//! Per-row random draws.
//!
//! The RNG is borrowed, never global: the caller seeds one `StdRng` and
//! threads it through every stage, so a seed plus a date range fully
//! determines the table.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Normal;
use tracing::debug;

use crate::categories::MaintenanceSeverity;
use crate::config::GeneratorConfig;
use crate::error::PulseError;

fn normal(mean: f64, std: f64) -> Result<Normal<f64>, PulseError> {
    Normal::new(mean, std)
        .map_err(|e| PulseError::Config(format!("normal({mean}, {std}): {e}")))
}

fn clip(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.max(lo).min(hi)
}

/// Draws the stochastic columns in a fixed order.
pub struct StochasticSampler<'a, R: Rng> {
    rng: &'a mut R,
    config: &'a GeneratorConfig,
}

impl<'a, R: Rng> StochasticSampler<'a, R> {
    pub fn new(rng: &'a mut R, config: &'a GeneratorConfig) -> Self {
        Self { rng, config }
    }

    /// Uniform integers in the inclusive population range.
    pub fn population(&mut self, n: usize) -> Vec<i64> {
        let (lo, hi) = self.config.population_range;
        (0..n).map(|_| self.rng.gen_range(lo..=hi)).collect()
    }

    /// Normal draws, clipped unconditionally to the configured band.
    pub fn academic_load(&mut self, n: usize) -> Result<Vec<f64>, PulseError> {
        let dist = normal(self.config.academic_load_mean, self.config.academic_load_std)?;
        let bounds = self.config.academic_load_bounds;
        Ok((0..n)
            .map(|_| clip(dist.sample(&mut *self.rng), bounds))
            .collect())
    }

    /// Yearly trend plus noise, clipped to the adoption band.
    pub fn adoption_ratio(&mut self, years: &[i32]) -> Result<Vec<f64>, PulseError> {
        let cfg = self.config;
        let dist = normal(0.0, cfg.adoption_noise_std)?;
        Ok(years
            .iter()
            .map(|&year| {
                let elapsed = f64::from(year - cfg.adoption_base_year);
                let trend = cfg.adoption_base + elapsed * cfg.adoption_yearly_growth;
                clip(trend + dist.sample(&mut *self.rng), cfg.adoption_bounds)
            })
            .collect())
    }

    /// Bernoulli trigger per row.
    pub fn maintenance_flags(&mut self, n: usize) -> Vec<bool> {
        let p = self.config.maintenance_probability;
        (0..n).map(|_| self.rng.gen::<f64>() < p).collect()
    }

    /// Severity for triggered rows only; untriggered rows are `None` and
    /// consume no randomness.
    pub fn maintenance_severity(
        &mut self,
        flags: &[bool],
    ) -> Result<Vec<MaintenanceSeverity>, PulseError> {
        let weights = &self.config.severity_weights;
        let index = WeightedIndex::new(weights.iter().map(|(_, w)| *w))
            .map_err(|e| PulseError::Config(format!("severity weights: {e}")))?;
        let severities: Vec<MaintenanceSeverity> = flags
            .iter()
            .map(|&fired| {
                if fired {
                    weights[index.sample(&mut *self.rng)].0
                } else {
                    MaintenanceSeverity::None
                }
            })
            .collect();
        debug!(
            triggered = flags.iter().filter(|f| **f).count(),
            "sampled maintenance severities"
        );
        Ok(severities)
    }

    /// Zero-mean noise whose standard deviation is a fixed share of each
    /// row's own demand.
    pub fn demand_noise(&mut self, demand: &[f64]) -> Result<Vec<f64>, PulseError> {
        let ratio = self.config.demand_noise_ratio;
        demand
            .iter()
            .map(|d| {
                let std = d.abs() * ratio;
                if std == 0.0 {
                    return Ok(0.0);
                }
                Ok(normal(0.0, std)?.sample(&mut *self.rng))
            })
            .collect()
    }
}
