//! Worst-case price projection over unacknowledged operations.
//!
//! An order's "true price" for cross checking is not a scalar: while
//! amendments are in flight the market may end up resting at any of the
//! unacked prices, or at the last price it acknowledged. The projection
//! takes the worst case against crossing: the highest reachable price
//! for a buy, the lowest for a sell.

use std::cmp::{max, min};

use omsim_core::{OperationKind, OperationState, Price, Side};

use crate::order::{Order, QuoteBook};

/// Worst-case live price of a single order.
///
/// Aggregates the latest acked insert/amend price with every unacked
/// one; `max` for buys, `min` for sells. Defaults to the order's intent
/// price when the chain carries no pricing operations.
pub fn live_price(order: &Order) -> Price {
    let agg: fn(Price, Price) -> Price = match order.side {
        Side::Buy => max,
        Side::Sell => min,
    };

    let mut inflight = order.price;
    let mut last_acked = order.price;
    for op in &order.ops {
        if !matches!(
            op.kind,
            OperationKind::InsertOrder | OperationKind::AmendOrder
        ) {
            continue;
        }
        let Some(price) = op.price() else { continue };
        if op.state == OperationState::Acked {
            // Only the very latest ack counts; earlier ones are history.
            last_acked = price;
        } else {
            inflight = agg(price, inflight);
        }
    }
    agg(inflight, last_acked)
}

/// Lowest ask price the market could end up resting at for the quote.
///
/// Scans the singleton's chain: the latest acked ask plus every unacked
/// one, skipping operations with no ask leg. `None` when the quote has
/// never carried ask interest.
pub fn quote_ask_floor(quote: &QuoteBook) -> Option<Price> {
    let mut last_acked = None;
    let mut lowest_unacked: Option<Price> = None;
    for op in &quote.ops {
        let Some(shape) = op.quote() else { continue };
        let Some(leg) = shape.ask else { continue };
        if op.state == OperationState::Acked {
            last_acked = Some(leg.price);
        } else {
            lowest_unacked = Some(match lowest_unacked {
                Some(current) => min(current, leg.price),
                None => leg.price,
            });
        }
    }
    match (last_acked, lowest_unacked) {
        (Some(a), Some(b)) => Some(min(a, b)),
        (a, b) => a.or(b),
    }
}

/// Highest bid price the market could end up resting at for the quote.
pub fn quote_bid_ceiling(quote: &QuoteBook) -> Option<Price> {
    let mut last_acked = None;
    let mut highest_unacked: Option<Price> = None;
    for op in &quote.ops {
        let Some(shape) = op.quote() else { continue };
        let Some(leg) = shape.bid else { continue };
        if op.state == OperationState::Acked {
            last_acked = Some(leg.price);
        } else {
            highest_unacked = Some(match highest_unacked {
                Some(current) => max(current, leg.price),
                None => leg.price,
            });
        }
    }
    match (last_acked, highest_unacked) {
        (Some(a), Some(b)) => Some(max(a, b)),
        (a, b) => a.or(b),
    }
}
