//! Order and operation entities.
//!
//! Each logical order owns an append-mostly chain of operations: its
//! history plus the pending pipeline. Only the tail of a chain may be
//! `Initial` or `Queued`; everything before it is `SentToMarket` or
//! `Acked`. Superseded queued operations are discarded from the chain
//! when a newer one takes their throttle slot.

use std::fmt;

use tracing::debug;

use omsim_core::{
    OpId, OperationKind, OperationState, OrderId, OrderState, Price, Qty, QuoteShape, Side,
};

/// Value snapshot captured when an operation is created.
///
/// The snapshot is what the market will see; the owning order's intent
/// fields may move on before this operation is ever released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSnapshot {
    Single { price: Price, qty: Qty },
    Quote(QuoteShape),
}

/// One market-directed mutation against an order.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OpId,
    /// Owning order (or the quote singleton).
    pub owner: OrderId,
    /// The market-resident operation this one supersedes, if any.
    pub previous: Option<OpId>,
    pub kind: OperationKind,
    pub state: OperationState,
    pub snapshot: OpSnapshot,
}

impl Operation {
    /// Snapshot price, for single-order operations.
    pub fn price(&self) -> Option<Price> {
        match self.snapshot {
            OpSnapshot::Single { price, .. } => Some(price),
            OpSnapshot::Quote(_) => None,
        }
    }

    /// Snapshot quote values, for quote operations.
    pub fn quote(&self) -> Option<&QuoteShape> {
        match &self.snapshot {
            OpSnapshot::Quote(shape) => Some(shape),
            OpSnapshot::Single { .. } => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ", self.kind, self.state)?;
        match &self.snapshot {
            OpSnapshot::Single { price, qty } => write!(f, "{qty}@{price}"),
            OpSnapshot::Quote(shape) => write!(f, "{shape}"),
        }
    }
}

/// A client-side logical order.
///
/// `price` and `qty` are the intent: they reflect the latest
/// caller-requested values and move immediately on amend, ahead of any
/// market acknowledgement.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty: Qty,
    pub state: OrderState,
    pub ops: Vec<Operation>,
}

impl Order {
    pub fn last_op_id(&self) -> Option<OpId> {
        self.ops.last().map(|op| op.id)
    }

    pub fn op(&self, id: OpId) -> Option<&Operation> {
        self.ops.iter().find(|op| op.id == id)
    }

    /// Discard every queued operation except `keep`, rewiring `keep`'s
    /// previous pointer to the first discarded operation's previous so
    /// the market-mirror delta chain stays intact.
    pub fn conflate_queued(&mut self, keep: OpId) {
        conflate_queued(&mut self.ops, keep);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}@{}, operations:",
            self.id, self.state, self.side, self.qty, self.price
        )?;
        for op in &self.ops {
            write!(f, " [{op}]")?;
        }
        Ok(())
    }
}

/// The two-sided quote singleton.
///
/// Exists from start-up until shutdown; a quote delete retires its
/// market interest but never the singleton itself.
#[derive(Debug, Clone)]
pub struct QuoteBook {
    pub id: OrderId,
    pub state: OrderState,
    pub ops: Vec<Operation>,
}

impl QuoteBook {
    pub fn last_op_id(&self) -> Option<OpId> {
        self.ops.last().map(|op| op.id)
    }

    /// See [`Order::conflate_queued`].
    pub fn conflate_queued(&mut self, keep: OpId) {
        conflate_queued(&mut self.ops, keep);
    }
}

impl fmt::Display for QuoteBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} quote, operations:", self.id, self.state)?;
        for op in &self.ops {
            write!(f, " [{op}]")?;
        }
        Ok(())
    }
}

/// Shared conflation helper for order and quote chains.
fn conflate_queued(ops: &mut Vec<Operation>, keep: OpId) {
    let mut rewired_previous: Option<Option<OpId>> = None;
    ops.retain(|op| {
        if op.id != keep && op.state == OperationState::Queued {
            if rewired_previous.is_none() {
                rewired_previous = Some(op.previous);
            }
            debug!(op = %op, "discarding superseded queued operation");
            return false;
        }
        true
    });
    if let Some(previous) = rewired_previous {
        if let Some(op) = ops.iter_mut().find(|op| op.id == keep) {
            op.previous = previous;
        }
    }
}
