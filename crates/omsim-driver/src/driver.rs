//! The per-tick simulation loop.
//!
//! One tick runs end-to-end with no suspension points: drain a batch of
//! requested actions, flush the throttle queue, process acks, collect
//! garbage. The whole loop is single-threaded; determinism comes from
//! the two seeded generators (action source and engine policy), both
//! derived from one configured seed.

use tracing::info;

use omsim_core::SimConfig;
use omsim_engine::{MarketSink, NullSink, OrderManager, SeededPolicy, Submission};

use crate::actions::{Action, ActionSource, RandomActionSource};

/// Counters accumulated across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    pub actions: u64,
    pub released: u64,
    pub queued: u64,
    pub rejected: u64,
    pub discarded: u64,
}

/// The simulation driver: action source and order manager, one tick at
/// a time.
pub struct Driver<S> {
    manager: OrderManager<S>,
    source: Box<dyn ActionSource>,
    stats: DriverStats,
}

impl Driver<NullSink> {
    /// Build a driver with the standard random source and a null sink.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self::with_sink(config, NullSink)
    }
}

impl<S: MarketSink> Driver<S> {
    /// Build a driver sending released operations into `sink`.
    ///
    /// The engine policy seeds from `seed + 1` so the two generator
    /// streams never overlap while a single number reproduces the run.
    pub fn with_sink(config: SimConfig, sink: S) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "seeding simulation");
        let source = RandomActionSource::new(&config, seed);
        let policy = SeededPolicy::new(&config, seed.wrapping_add(1));
        let manager = OrderManager::new(config, Box::new(policy), sink);
        Self {
            manager,
            source: Box::new(source),
            stats: DriverStats::default(),
        }
    }

    pub fn manager(&self) -> &OrderManager<S> {
        &self.manager
    }

    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    /// Run one tick: generate, flush, ack, collect.
    pub fn tick(&mut self) {
        let batch = self.source.batch_size();
        for _ in 0..batch {
            let Some(action) = self.source.next_action(self.manager.book()) else {
                continue;
            };
            self.apply(action);
        }

        self.manager.flush();
        self.manager.process_acks();
        self.manager.collect_garbage();

        self.stats.ticks += 1;
        if self.stats.ticks % 100 == 0 {
            info!(
                ticks = self.stats.ticks,
                actions = self.stats.actions,
                released = self.stats.released,
                queued = self.stats.queued,
                rejected = self.stats.rejected,
                discarded = self.stats.discarded,
                orders = self.manager.book().len(),
                queue = self.manager.throttle().len(),
                "tick summary"
            );
        }
    }

    /// Run `ticks` ticks; `0` runs until the process is interrupted.
    pub fn run(&mut self, ticks: u64) {
        if ticks == 0 {
            loop {
                self.tick();
            }
        }
        for _ in 0..ticks {
            self.tick();
        }
        info!(stats = ?self.stats, "run complete");
    }

    fn apply(&mut self, action: Action) {
        self.stats.actions += 1;
        let result = match action {
            Action::Insert { side, price, qty } => self.manager.insert_order(side, price, qty),
            Action::Amend { order, price, qty } => self.manager.amend_order(order, price, qty),
            Action::Delete { order } => self.manager.delete_order(order),
            Action::Quote { shape } => self.manager.quote(shape),
            Action::DeleteQuote => self.manager.delete_quote(),
        };
        match result {
            Submission::Released { .. } => self.stats.released += 1,
            Submission::Queued { .. } => self.stats.queued += 1,
            Submission::Rejected { .. } => self.stats.rejected += 1,
            Submission::Discarded { .. } => self.stats.discarded += 1,
        }
    }
}
