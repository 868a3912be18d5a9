//! Random action generation.
//!
//! Produces the requested-action stream the manager consumes. Targets
//! for amends and deletes are resolved against the live book at draw
//! time, so an action never names an order that a previous action in
//! the same batch already removed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use omsim_book::OrderBook;
use omsim_core::{OrderId, Price, Qty, QuoteLeg, QuoteShape, Side, SimConfig};

/// One requested action, fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert { side: Side, price: Price, qty: Qty },
    Amend { order: OrderId, price: Price, qty: Qty },
    Delete { order: OrderId },
    Quote { shape: QuoteShape },
    DeleteQuote,
}

/// Source of requested actions, one batch per tick.
pub trait ActionSource {
    /// How many actions to attempt this tick.
    fn batch_size(&mut self) -> usize;

    /// Draw the next action against the current book. `None` when the
    /// drawn action has no viable target (e.g. an amend with no live
    /// order to aim at).
    fn next_action(&mut self, book: &OrderBook) -> Option<Action>;
}

/// Seeded random action source.
///
/// Action weights: quote 6, amend 3, insert 1, delete 1, quote-delete 1.
/// Quote legs are generated non-crossed (ask strictly above bid).
pub struct RandomActionSource {
    rng: ChaCha8Rng,
    upper_price: u32,
    max_qty: u32,
    max_batch: u32,
}

impl RandomActionSource {
    #[must_use]
    pub fn new(config: &SimConfig, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            upper_price: config.upper_price,
            max_qty: config.max_qty,
            max_batch: config.max_ops_per_batch,
        }
    }

    fn price(&mut self) -> Price {
        Price::new(self.rng.gen_range(1..=self.upper_price))
    }

    fn qty(&mut self) -> Qty {
        Qty::new(self.rng.gen_range(1..=self.max_qty))
    }

    fn side(&mut self) -> Side {
        if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    fn quote_shape(&mut self) -> QuoteShape {
        let bid_price = self.rng.gen_range(1..=self.upper_price - 1);
        let ask_price = self.rng.gen_range(bid_price + 1..=self.upper_price);
        QuoteShape::two_sided(
            QuoteLeg::new(Price::new(bid_price), self.qty()),
            QuoteLeg::new(Price::new(ask_price), self.qty()),
        )
    }

    /// Pick a random amendable/deletable order: bounded attempts,
    /// skipping anything departing or gone.
    fn pick_live(&mut self, book: &OrderBook) -> Option<OrderId> {
        let orders = book.orders();
        if orders.is_empty() {
            return None;
        }
        for _ in 0..orders.len() {
            let idx = self.rng.gen_range(0..orders.len());
            let order = &orders[idx];
            if order.state.is_live() {
                return Some(order.id);
            }
        }
        None
    }
}

impl ActionSource for RandomActionSource {
    fn batch_size(&mut self) -> usize {
        self.rng.gen_range(1..=self.max_batch) as usize
    }

    fn next_action(&mut self, book: &OrderBook) -> Option<Action> {
        match self.rng.gen_range(0..12u32) {
            0 => Some(Action::Insert {
                side: self.side(),
                price: self.price(),
                qty: self.qty(),
            }),
            1..=3 => {
                let order = self.pick_live(book)?;
                Some(Action::Amend {
                    order,
                    price: self.price(),
                    qty: self.qty(),
                })
            }
            4 => {
                let order = self.pick_live(book)?;
                Some(Action::Delete { order })
            }
            5..=10 => Some(Action::Quote {
                shape: self.quote_shape(),
            }),
            _ => Some(Action::DeleteQuote),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(seed: u64) -> RandomActionSource {
        RandomActionSource::new(&SimConfig::default(), seed)
    }

    #[test]
    fn test_same_seed_same_actions() {
        let book = OrderBook::new();
        let mut a = source(42);
        let mut b = source(42);

        for _ in 0..200 {
            assert_eq!(a.next_action(&book), b.next_action(&book));
        }
    }

    #[test]
    fn test_batch_size_within_bounds() {
        let cfg = SimConfig::default();
        let mut src = source(7);
        for _ in 0..200 {
            let n = src.batch_size();
            assert!(n >= 1 && n <= cfg.max_ops_per_batch as usize);
        }
    }

    #[test]
    fn test_generated_quotes_never_self_cross() {
        let mut src = source(3);
        for _ in 0..500 {
            let shape = src.quote_shape();
            let bid = shape.bid.unwrap();
            let ask = shape.ask.unwrap();
            assert!(ask.price > bid.price);
        }
    }

    #[test]
    fn test_prices_and_quantities_within_ladder() {
        let cfg = SimConfig::default();
        let mut src = source(11);
        for _ in 0..500 {
            let price = src.price().inner();
            assert!(price >= 1 && price <= cfg.upper_price);
            let qty = src.qty().inner();
            assert!(qty >= 1 && qty <= cfg.max_qty);
        }
    }

    #[test]
    fn test_amend_and_delete_skip_empty_book() {
        let book = OrderBook::new();
        let mut src = source(5);

        // With no orders, every drawn amend/delete collapses to None;
        // everything else resolves.
        for _ in 0..200 {
            if let Some(action) = src.next_action(&book) {
                assert!(!matches!(
                    action,
                    Action::Amend { .. } | Action::Delete { .. }
                ));
            }
        }
    }

    #[test]
    fn test_quote_is_the_most_common_action() {
        let book = OrderBook::new();
        let mut src = source(9);
        let mut quotes = 0;
        let mut inserts = 0;
        for _ in 0..1200 {
            match src.next_action(&book) {
                Some(Action::Quote { .. }) => quotes += 1,
                Some(Action::Insert { .. }) => inserts += 1,
                _ => {}
            }
        }
        // Six quote weights against one insert weight.
        assert!(quotes > inserts * 3);
    }
}
