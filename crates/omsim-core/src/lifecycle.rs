//! Lifecycle enums for orders and their operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a logical order across its market round-trips.
///
/// Transitions: `PriorToMarket -> OnMarket -> DeleteSentToMarket -> Finalised`.
/// An order deleted before ever reaching the wire is destroyed directly
/// from `PriorToMarket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderState {
    /// Created locally, nothing sent yet (possibly queued).
    #[default]
    PriorToMarket,
    /// At least one operation has been released to the market.
    OnMarket,
    /// A delete has been released; awaiting its ack.
    DeleteSentToMarket,
    /// Delete acknowledged. Terminal.
    Finalised,
}

impl OrderState {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalised)
    }

    /// Returns true if the order can still be amended or deleted.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::PriorToMarket | Self::OnMarket)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriorToMarket => write!(f, "PriorToMarket"),
            Self::OnMarket => write!(f, "OnMarket"),
            Self::DeleteSentToMarket => write!(f, "DeleteSentToMarket"),
            Self::Finalised => write!(f, "Finalised"),
        }
    }
}

/// Kind of a market-directed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    InsertOrder,
    InsertQuote,
    AmendOrder,
    DeleteOrder,
    DeleteQuote,
}

impl OperationKind {
    /// Returns true for operations that remove interest from the market.
    #[must_use]
    pub fn is_delete(self) -> bool {
        matches!(self, Self::DeleteOrder | Self::DeleteQuote)
    }

    /// Returns true for operations that leave interest resting on the market.
    #[must_use]
    pub fn is_resting(self) -> bool {
        matches!(self, Self::InsertOrder | Self::AmendOrder | Self::InsertQuote)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertOrder => write!(f, "InsertOrder"),
            Self::InsertQuote => write!(f, "InsertQuote"),
            Self::AmendOrder => write!(f, "AmendOrder"),
            Self::DeleteOrder => write!(f, "DeleteOrder"),
            Self::DeleteQuote => write!(f, "DeleteQuote"),
        }
    }
}

/// State of a single operation.
///
/// `Queued` is optional: an operation bypasses the queue entirely when the
/// throttle window is open and the queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationState {
    /// Just created, not yet routed.
    #[default]
    Initial,
    /// Parked in the throttle queue.
    Queued,
    /// Released to the market, awaiting ack.
    SentToMarket,
    /// Acknowledged by the market. Terminal.
    Acked,
}

impl OperationState {
    /// Returns true once the market has confirmed the operation.
    #[must_use]
    pub fn is_acked(self) -> bool {
        matches!(self, Self::Acked)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "Initial"),
            Self::Queued => write!(f, "Queued"),
            Self::SentToMarket => write!(f, "SentToMarket"),
            Self::Acked => write!(f, "Acked"),
        }
    }
}
