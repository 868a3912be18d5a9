//! Market-bound operation descriptors.
//!
//! A `MarketOperation` is the value handed to the market sink when an
//! operation is released. It is a self-contained snapshot: the market
//! mirror keeps a copy of every resting descriptor and resolves the
//! `previous` link against its own map, never against the order book.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{OpId, OrderId};
use crate::lifecycle::OperationKind;
use crate::types::{Price, Qty, QuoteShape, Side};

/// Payload of a market-bound operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketPayload {
    /// A single-order insert, amend or delete.
    Single { side: Side, price: Price, qty: Qty },
    /// A two-sided quote insert or delete.
    Quote(QuoteShape),
}

/// Descriptor for one operation released to the market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOperation {
    /// Operation id.
    pub op: OpId,
    /// Owning order (or the quote singleton).
    pub order: OrderId,
    /// What this operation does.
    pub kind: OperationKind,
    /// The market-resident operation this one supersedes, if any.
    pub previous: Option<OpId>,
    /// Value snapshot captured when the operation was created.
    pub payload: MarketPayload,
}

impl fmt::Display for MarketOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        match &self.payload {
            MarketPayload::Single { side, price, qty } => {
                write!(f, "{side} {qty}@{price}")?;
            }
            MarketPayload::Quote(shape) => write!(f, "{shape}")?,
        }
        write!(f, " ({}/{})", self.order, self.op)
    }
}
