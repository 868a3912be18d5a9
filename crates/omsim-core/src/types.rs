//! Trading primitives: side, price, quantity, quote legs.
//!
//! Prices live on an integer ladder `[1, upper_price]`; quantities are
//! positive integers. The newtypes exist so a price can never be passed
//! where a quantity is expected, which is exactly the confusion behind
//! a past cross-check bug.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Price level on the integer ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u32);

impl Price {
    #[inline]
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qty(u32);

impl Qty {
    #[inline]
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One leg of a two-sided quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLeg {
    pub price: Price,
    pub qty: Qty,
}

impl QuoteLeg {
    #[must_use]
    pub fn new(price: Price, qty: Qty) -> Self {
        Self { price, qty }
    }
}

/// Two-sided quote values. An absent leg means no interest on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteShape {
    pub bid: Option<QuoteLeg>,
    pub ask: Option<QuoteLeg>,
}

impl QuoteShape {
    /// A quote with both legs set.
    #[must_use]
    pub fn two_sided(bid: QuoteLeg, ask: QuoteLeg) -> Self {
        Self {
            bid: Some(bid),
            ask: Some(ask),
        }
    }

    /// A quote with neither leg set (used by quote deletes).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bid.is_none() && self.ask.is_none()
    }
}

impl fmt::Display for QuoteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bid {
            Some(leg) => write!(f, "{}@{}", leg.qty, leg.price)?,
            None => write!(f, "-")?,
        }
        write!(f, "--")?;
        match self.ask {
            Some(leg) => write!(f, "{}@{}", leg.qty, leg.price),
            None => write!(f, "-"),
        }
    }
}
