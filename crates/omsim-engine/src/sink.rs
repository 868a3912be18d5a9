//! The seam between the engine and whatever consumes released operations.

use tracing::trace;

use omsim_core::MarketOperation;

/// Receiver of market-bound operations.
///
/// The engine guarantees every descriptor handed over here has already
/// passed the cross check and the mirror's no-cross assertion.
pub trait MarketSink {
    fn send(&mut self, op: &MarketOperation);
}

/// Sink that drops operations after a trace log. Used by long
/// simulation runs where the mirror is the only consumer that matters.
#[derive(Debug, Default)]
pub struct NullSink;

impl MarketSink for NullSink {
    fn send(&mut self, op: &MarketOperation) {
        trace!(op = %op, "operation dropped by null sink");
    }
}

/// Sink that records everything sent, in order. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub sent: Vec<MarketOperation>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}

impl MarketSink for RecordingSink {
    fn send(&mut self, op: &MarketOperation) {
        self.sent.push(op.clone());
    }
}
