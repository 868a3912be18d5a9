//! Outbound throttle queue.
//!
//! At most one pending operation per order: enqueueing evicts anything
//! the same order already had waiting, so only the newest update
//! survives. The flush drains newest-first in two passes, deletes ahead
//! of everything else.

use tracing::debug;

use omsim_core::{OpId, OperationKind, OrderId};

use crate::policy::TickPolicy;

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    order: OrderId,
    op: OpId,
    kind: OperationKind,
}

/// The conflating outbound queue.
#[derive(Debug, Default)]
pub struct ThrottleQueue {
    entries: Vec<QueueEntry>,
}

impl ThrottleQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_order(&self, order: OrderId) -> bool {
        self.entries.iter().any(|e| e.order == order)
    }

    /// Queued entries in queue order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = (OrderId, OpId)> + '_ {
        self.entries.iter().map(|e| (e.order, e.op))
    }

    /// Is the window open? Never while something is already queued;
    /// otherwise a Bernoulli draw from the policy.
    pub fn window_open(&self, policy: &mut dyn TickPolicy) -> bool {
        if !self.entries.is_empty() {
            return false;
        }
        policy.throttle_open()
    }

    /// Queue an operation, evicting any earlier entry for the same
    /// order. Returns the evicted op ids.
    pub fn push(&mut self, order: OrderId, op: OpId, kind: OperationKind) -> Vec<OpId> {
        let evicted = self.evict(order);
        self.entries.push(QueueEntry { order, op, kind });
        debug!(%order, %op, queue_len = self.entries.len(), "operation queued");
        evicted
    }

    /// Remove every entry belonging to `order`. Returns the removed op ids.
    pub fn evict(&mut self, order: OrderId) -> Vec<OpId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if e.order == order {
                debug!(%order, op = %e.op, "evicting queued operation");
                removed.push(e.op);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Release up to `window` operations: two newest-first passes,
    /// deletes in the first, everything else in the second.
    pub fn drain(&mut self, window: usize) -> Vec<(OrderId, OpId)> {
        let mut released = Vec::new();
        let mut budget = window;

        for deletes_pass in [true, false] {
            let mut i = self.entries.len();
            while i > 0 && budget > 0 {
                i -= 1;
                if self.entries[i].kind.is_delete() == deletes_pass {
                    let entry = self.entries.remove(i);
                    released.push((entry.order, entry.op));
                    budget -= 1;
                }
            }
        }

        released
    }
}
