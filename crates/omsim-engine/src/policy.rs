//! Injectable stochastic policies.
//!
//! The throttle probability, flush window and ack budget are mechanisms,
//! not contracts: production runs draw them from a seeded generator,
//! tests pin them to fixed values.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use omsim_core::SimConfig;

/// Per-tick stochastic draws.
pub trait TickPolicy {
    /// Bernoulli draw: is the throttle window open right now?
    fn throttle_open(&mut self) -> bool;

    /// How many operations may leave the queue this flush.
    fn flush_window(&mut self) -> usize;

    /// How many acks the market delivers this tick.
    fn ack_budget(&mut self) -> usize;
}

/// Deterministic seeded policy used by simulation runs.
pub struct SeededPolicy {
    rng: ChaCha8Rng,
    throttle_likelihood: f64,
    max_flush: u32,
    max_acks: u32,
}

impl SeededPolicy {
    #[must_use]
    pub fn new(config: &SimConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            throttle_likelihood: config.throttle_likelihood,
            max_flush: config.max_ops_per_flush,
            max_acks: config.max_acks_per_tick,
        }
    }
}

impl TickPolicy for SeededPolicy {
    fn throttle_open(&mut self) -> bool {
        self.rng.gen_bool(1.0 - self.throttle_likelihood)
    }

    fn flush_window(&mut self) -> usize {
        self.rng.gen_range(0..=self.max_flush) as usize
    }

    fn ack_budget(&mut self) -> usize {
        self.rng.gen_range(0..=self.max_acks) as usize
    }
}

/// Fixed policy for tests: no randomness at all.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    pub open: bool,
    pub window: usize,
    pub acks: usize,
}

impl FixedPolicy {
    /// Throttle always open, generous windows.
    #[must_use]
    pub fn wide_open() -> Self {
        Self {
            open: true,
            window: usize::MAX,
            acks: usize::MAX,
        }
    }

    /// Throttle always closed, nothing flushes or acks on its own.
    #[must_use]
    pub fn shut() -> Self {
        Self {
            open: false,
            window: 0,
            acks: 0,
        }
    }
}

impl TickPolicy for FixedPolicy {
    fn throttle_open(&mut self) -> bool {
        self.open
    }

    fn flush_window(&mut self) -> usize {
        self.window
    }

    fn ack_budget(&mut self) -> usize {
        self.acks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_policy_is_deterministic() {
        let cfg = SimConfig::default();
        let mut a = SeededPolicy::new(&cfg, 42);
        let mut b = SeededPolicy::new(&cfg, 42);

        for _ in 0..100 {
            assert_eq!(a.throttle_open(), b.throttle_open());
            assert_eq!(a.flush_window(), b.flush_window());
            assert_eq!(a.ack_budget(), b.ack_budget());
        }
    }

    #[test]
    fn test_draws_respect_bounds() {
        let cfg = SimConfig::default();
        let mut policy = SeededPolicy::new(&cfg, 7);

        for _ in 0..200 {
            assert!(policy.flush_window() <= cfg.max_ops_per_flush as usize);
            assert!(policy.ack_budget() <= cfg.max_acks_per_tick as usize);
        }
    }

    #[test]
    fn test_zero_likelihood_never_throttles() {
        let cfg = SimConfig {
            throttle_likelihood: 0.0,
            ..SimConfig::default()
        };
        let mut policy = SeededPolicy::new(&cfg, 7);
        for _ in 0..100 {
            assert!(policy.throttle_open());
        }
    }
}
