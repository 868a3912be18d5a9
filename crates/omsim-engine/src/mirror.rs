//! Local replica of the market's resting interest.
//!
//! Every released operation passes through here before the sink. The
//! mirror removes the descriptor the operation supersedes, keeps
//! inserts/amends/quotes as resting interest, and then asserts the one
//! contract the whole core exists to uphold: no price level populated
//! on both sides. Violations are programmer errors and abort.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use tracing::error;

use omsim_core::{MarketOperation, MarketPayload, OpId, Price, Side};

/// The market's view of what is currently resting, keyed by op id.
#[derive(Debug, Default)]
pub struct MarketMirror {
    resting: HashMap<OpId, MarketOperation>,
}

impl MarketMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.resting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resting.is_empty()
    }

    pub fn contains(&self, op: OpId) -> bool {
        self.resting.contains_key(&op)
    }

    pub fn get(&self, op: OpId) -> Option<&MarketOperation> {
        self.resting.get(&op)
    }

    /// Apply a released operation to the replica.
    ///
    /// # Panics
    /// Panics when the superseded operation is absent, or when applying
    /// the operation leaves a price level populated on both sides.
    pub fn apply(&mut self, op: &MarketOperation) {
        if let Some(previous) = op.previous {
            if self.resting.remove(&previous).is_none() {
                error!(op = %op, %previous, "superseded operation missing from market mirror");
                panic!("superseded operation {previous} missing from market mirror");
            }
        }
        if op.kind.is_resting() {
            self.resting.insert(op.op, op.clone());
        }
        self.assert_uncrossed();
    }

    /// Aggregate resting bid quantity per price level.
    pub fn bids(&self) -> BTreeMap<Price, u64> {
        self.levels(Side::Buy)
    }

    /// Aggregate resting ask quantity per price level.
    pub fn asks(&self) -> BTreeMap<Price, u64> {
        self.levels(Side::Sell)
    }

    fn levels(&self, side: Side) -> BTreeMap<Price, u64> {
        let mut levels = BTreeMap::new();
        for op in self.resting.values() {
            match &op.payload {
                MarketPayload::Single {
                    side: op_side,
                    price,
                    qty,
                } => {
                    if *op_side == side {
                        *levels.entry(*price).or_insert(0) += u64::from(qty.inner());
                    }
                }
                MarketPayload::Quote(shape) => {
                    let leg = match side {
                        Side::Buy => shape.bid,
                        Side::Sell => shape.ask,
                    };
                    if let Some(leg) = leg {
                        *levels.entry(leg.price).or_insert(0) += u64::from(leg.qty.inner());
                    }
                }
            }
        }
        levels
    }

    /// Render the resting book as a price ladder, best levels innermost.
    pub fn ladder(&self) -> String {
        let bids = self.bids();
        let asks = self.asks();
        let top = bids
            .keys()
            .chain(asks.keys())
            .map(|p| p.inner())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for price in (1..=top).rev() {
            let level = Price::new(price);
            let bid = bids.get(&level).copied().unwrap_or(0);
            let ask = asks.get(&level).copied().unwrap_or(0);
            let bid_cell = if bid > 0 {
                format!("{bid:>5}")
            } else {
                " ".repeat(5)
            };
            let ask_cell = if ask > 0 {
                format!("{ask:<5}")
            } else {
                String::new()
            };
            let _ = writeln!(out, "{bid_cell} {price} {ask_cell}");
        }
        out
    }

    fn assert_uncrossed(&self) {
        let bids = self.bids();
        let asks = self.asks();
        for level in bids.keys() {
            if asks.contains_key(level) {
                error!(
                    level = %level,
                    ladder = %self.ladder(),
                    "market mirror in cross"
                );
                panic!("market mirror in cross at price level {level}");
            }
        }
    }
}
