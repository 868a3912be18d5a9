//! Simulation configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Simulation parameters.
///
/// Every stochastic mechanism in the core draws its bounds from here;
/// the defaults reproduce the venue limits the simulator was built
/// against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Upper bound of the per-flush release window.
    #[serde(default = "default_max_ops_per_flush")]
    pub max_ops_per_flush: u32,
    /// Upper bound of the per-tick generated action batch.
    #[serde(default = "default_max_ops_per_batch")]
    pub max_ops_per_batch: u32,
    /// Probability that the throttle window is closed on any given check.
    #[serde(default = "default_throttle_likelihood")]
    pub throttle_likelihood: f64,
    /// Upper bound of the per-tick ack budget.
    #[serde(default = "default_max_acks_per_tick")]
    pub max_acks_per_tick: u32,
    /// Top of the integer price ladder (prices run `1..=upper_price`).
    #[serde(default = "default_upper_price")]
    pub upper_price: u32,
    /// Largest randomly generated quantity.
    #[serde(default = "default_max_qty")]
    pub max_qty: u32,
    /// Prune finalised orders once the book grows beyond this.
    #[serde(default = "default_order_gc_threshold")]
    pub order_gc_threshold: usize,
    /// Trim the quote op chain once it grows beyond this.
    #[serde(default = "default_quote_ops_gc_threshold")]
    pub quote_ops_gc_threshold: usize,
    /// How many trailing quote ops survive a trim.
    #[serde(default = "default_quote_ops_gc_keep_tail")]
    pub quote_ops_gc_keep_tail: usize,
    /// RNG seed for deterministic replays. Absent means seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_ops_per_flush() -> u32 {
    10
}

fn default_max_ops_per_batch() -> u32 {
    10
}

fn default_throttle_likelihood() -> f64 {
    0.15
}

fn default_max_acks_per_tick() -> u32 {
    10
}

fn default_upper_price() -> u32 {
    9
}

fn default_max_qty() -> u32 {
    100
}

fn default_order_gc_threshold() -> usize {
    1000
}

fn default_quote_ops_gc_threshold() -> usize {
    200
}

fn default_quote_ops_gc_keep_tail() -> usize {
    50
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_ops_per_flush: default_max_ops_per_flush(),
            max_ops_per_batch: default_max_ops_per_batch(),
            throttle_likelihood: default_throttle_likelihood(),
            max_acks_per_tick: default_max_acks_per_tick(),
            upper_price: default_upper_price(),
            max_qty: default_max_qty(),
            order_gc_threshold: default_order_gc_threshold(),
            quote_ops_gc_threshold: default_quote_ops_gc_threshold(),
            quote_ops_gc_keep_tail: default_quote_ops_gc_keep_tail(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.throttle_likelihood) {
            return Err(CoreError::InvalidConfig(format!(
                "throttle_likelihood must be within [0, 1], got {}",
                self.throttle_likelihood
            )));
        }
        if self.upper_price < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "upper_price must be at least 2 to leave room for a two-sided quote, got {}",
                self.upper_price
            )));
        }
        if self.max_qty == 0 {
            return Err(CoreError::InvalidConfig(
                "max_qty must be positive".to_string(),
            ));
        }
        if self.max_ops_per_batch == 0 {
            return Err(CoreError::InvalidConfig(
                "max_ops_per_batch must be positive".to_string(),
            ));
        }
        if self.quote_ops_gc_keep_tail >= self.quote_ops_gc_threshold {
            return Err(CoreError::InvalidConfig(format!(
                "quote_ops_gc_keep_tail ({}) must be below quote_ops_gc_threshold ({})",
                self.quote_ops_gc_keep_tail, self.quote_ops_gc_threshold
            )));
        }
        Ok(())
    }
}
