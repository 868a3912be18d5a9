//! Pre-trade cross prevention.
//!
//! Before any insert, amend or quote is released, prove that no
//! interleaving of outstanding acks can leave the market self-crossed.
//! Equality at the top of book counts as a cross: only strictly
//! opposing prices are safe.

use tracing::debug;

use omsim_core::{OrderId, OrderState, Price, QuoteShape, Side};

use crate::book::OrderBook;
use crate::order::Order;
use crate::projection::{live_price, quote_ask_floor, quote_bid_ceiling};

/// Why a pending operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossReason {
    /// Crosses the live quote's projected opposing side.
    AgainstQuote { level: Price },
    /// Crosses another local order's projected price.
    AgainstOrder { other: OrderId },
}

/// Check a pending single order (a fresh insert or a just-amended order)
/// against the quote singleton and every opposing live order.
pub fn order_would_cross(book: &OrderBook, pending: &Order) -> Option<CrossReason> {
    // The quote first. The pending order's requested price is compared
    // against the quote's projected opposing side; note the comparison
    // is price against price on both legs.
    match pending.side {
        Side::Buy => {
            if let Some(floor) = quote_ask_floor(book.quote()) {
                if pending.price >= floor {
                    debug!(order = %pending.id, level = %floor, "buy crosses the quote ask");
                    return Some(CrossReason::AgainstQuote { level: floor });
                }
            }
        }
        Side::Sell => {
            if let Some(ceiling) = quote_bid_ceiling(book.quote()) {
                if pending.price <= ceiling {
                    debug!(order = %pending.id, level = %ceiling, "sell crosses the quote bid");
                    return Some(CrossReason::AgainstQuote { level: ceiling });
                }
            }
        }
    }

    // Then every opposing order that could still rest on the market.
    for other in book.orders() {
        if other.side == pending.side {
            continue;
        }
        if matches!(
            other.state,
            OrderState::Finalised | OrderState::DeleteSentToMarket
        ) {
            continue;
        }

        let crossed = match pending.side {
            Side::Buy => live_price(pending) >= live_price(other),
            Side::Sell => live_price(pending) <= live_price(other),
        };
        if crossed {
            debug!(order = %pending.id, other = %other.id, "order crosses an existing order");
            return Some(CrossReason::AgainstOrder { other: other.id });
        }
    }

    None
}

/// Check a pending quote against every opposing live single order.
///
/// Quotes never cross against themselves: the ask leg must stay strictly
/// above every buy order's projection, the bid leg strictly below every
/// sell order's.
pub fn quote_would_cross(book: &OrderBook, shape: &QuoteShape) -> Option<CrossReason> {
    for order in book.orders() {
        if matches!(
            order.state,
            OrderState::Finalised | OrderState::DeleteSentToMarket
        ) {
            continue;
        }

        let crossed = match order.side {
            Side::Buy => shape
                .ask
                .is_some_and(|ask| ask.price <= live_price(order)),
            Side::Sell => shape
                .bid
                .is_some_and(|bid| bid.price >= live_price(order)),
        };
        if crossed {
            debug!(other = %order.id, "quote crosses an existing order");
            return Some(CrossReason::AgainstOrder { other: order.id });
        }
    }
    None
}
