//! Identifier types for orders and operations.
//!
//! Orders and operations refer to each other across the order book, the
//! throttle queue and the market mirror. Those references are plain
//! numeric ids rather than pointers, so a referencing collection can
//! outlive (or be pruned independently of) the referenced entity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a logical order (the quote singleton included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ord-{}", self.0)
    }
}

/// Unique identifier for a single market-directed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpId(u64);

impl OpId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// Monotonic allocator for order and operation ids.
///
/// Ids start at 1 and never repeat within a run.
#[derive(Debug)]
pub struct IdAllocator {
    next_order: u64,
    next_op: u64,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_order: 1,
            next_op: 1,
        }
    }

    /// Allocate the next order id.
    pub fn order_id(&mut self) -> OrderId {
        let id = OrderId(self.next_order);
        self.next_order += 1;
        id
    }

    /// Allocate the next operation id.
    pub fn op_id(&mut self) -> OpId {
        let id = OpId(self.next_op);
        self.next_op += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
