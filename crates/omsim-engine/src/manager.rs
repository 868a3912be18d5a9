//! The order manager.
//!
//! The client-side state machine between an action source and the
//! market: every requested insert, amend, delete or quote passes the
//! cross check, then either goes straight to the market or parks in the
//! throttle queue. Acks come back through here and advance the
//! lifecycle of each order's operation chain.

use tracing::{debug, error, info, warn};

use omsim_book::{order_would_cross, quote_would_cross, CrossReason, OpSnapshot, OrderBook};
use omsim_core::{
    MarketOperation, MarketPayload, OpId, OperationKind, OperationState, OrderId, OrderState,
    Price, Qty, QuoteShape, Side, SimConfig,
};

use crate::mirror::MarketMirror;
use crate::policy::TickPolicy;
use crate::sink::MarketSink;
use crate::throttle::ThrottleQueue;

/// Outcome of a requested action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Released straight to the market: the window was open.
    Released { order: OrderId, op: OpId },
    /// Accepted and parked in the throttle queue.
    Queued { order: OrderId, op: OpId },
    /// Refused by the cross check; nothing reached the market.
    Rejected { reason: CrossReason },
    /// Resolved locally; no market operation was emitted.
    Discarded { order: OrderId },
}

impl Submission {
    #[must_use]
    pub fn is_released(&self) -> bool {
        matches!(self, Self::Released { .. })
    }

    #[must_use]
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued { .. })
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The order the action resolved against, when it survived.
    #[must_use]
    pub fn order(&self) -> Option<OrderId> {
        match self {
            Self::Released { order, .. }
            | Self::Queued { order, .. }
            | Self::Discarded { order } => Some(*order),
            Self::Rejected { .. } => None,
        }
    }
}

/// The order manager: book, queue, mirror and policy threaded together.
pub struct OrderManager<S> {
    config: SimConfig,
    book: OrderBook,
    throttle: ThrottleQueue,
    mirror: MarketMirror,
    policy: Box<dyn TickPolicy>,
    sink: S,
}

impl<S: MarketSink> OrderManager<S> {
    #[must_use]
    pub fn new(config: SimConfig, policy: Box<dyn TickPolicy>, sink: S) -> Self {
        Self {
            config,
            book: OrderBook::new(),
            throttle: ThrottleQueue::new(),
            mirror: MarketMirror::new(),
            policy,
            sink,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn mirror(&self) -> &MarketMirror {
        &self.mirror
    }

    pub fn throttle(&self) -> &ThrottleQueue {
        &self.throttle
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // === Public operations ===

    /// Create a new order and route its insert.
    ///
    /// A crossing insert discards the order entirely: it never existed
    /// as far as the market is concerned.
    pub fn insert_order(&mut self, side: Side, price: Price, qty: Qty) -> Submission {
        let order = self.book.new_order(side, price, qty);
        let op = self
            .book
            .order(order)
            .and_then(|o| o.last_op_id())
            .expect("fresh order has an insert operation");
        info!(order = %self.book.order(order).unwrap(), "order insert");

        if let Some(reason) = order_would_cross(&self.book, self.book.order(order).unwrap()) {
            warn!(%order, ?reason, "order insert crossed, rejecting");
            self.book.remove_order(order);
            return Submission::Rejected { reason };
        }
        self.dispatch(order, op)
    }

    /// Move an order's intent and route the amend.
    ///
    /// A crossing amend is escalated: the amend is popped and the order
    /// is deleted, because its resting price can no longer be trusted
    /// against the requested one.
    pub fn amend_order(&mut self, order: OrderId, price: Price, qty: Qty) -> Submission {
        self.check_operable(order);
        let op = self.book.append_amend(order, price, qty);
        info!(order = %self.book.order(order).unwrap(), "order amend");

        if let Some(reason) = order_would_cross(&self.book, self.book.order(order).unwrap()) {
            warn!(%order, ?reason, "order amend crossed, rejecting and deleting the order");
            self.book.pop_last_op(order);
            self.delete_order(order);
            return Submission::Rejected { reason };
        }
        self.dispatch(order, op)
    }

    /// Delete an order.
    ///
    /// An order that never reached the market is resolved locally: its
    /// queued operation is evicted and the order is removed outright.
    pub fn delete_order(&mut self, order: OrderId) -> Submission {
        self.check_operable(order);
        let op = self.book.append_delete(order);
        info!(order = %self.book.order(order).unwrap(), "order delete");

        if self.book.order(order).unwrap().state == OrderState::PriorToMarket {
            self.throttle.evict(order);
            self.book.set_state(order, OrderState::Finalised);
            self.book.remove_order(order);
            debug!(%order, "order deleted before reaching the market");
            return Submission::Discarded { order };
        }

        self.throttle.evict(order);
        self.book.conflate_queued(order, op);
        self.book.set_state(order, OrderState::DeleteSentToMarket);
        self.dispatch(order, op)
    }

    /// Replace the two-sided quote.
    pub fn quote(&mut self, shape: QuoteShape) -> Submission {
        let quote_id = self.book.quote().id;
        let op = self.book.append_quote(shape);
        info!(%shape, "quote insert");

        if let Some(reason) = quote_would_cross(&self.book, &shape) {
            warn!(?reason, "quote insert crossed, rejecting");
            self.book.pop_last_quote_op();
            return Submission::Rejected { reason };
        }

        // A quote delete still sitting in the queue is superseded by
        // this insert (conflation will drop it): the singleton is no
        // longer departing.
        if self.book.quote().state == OrderState::DeleteSentToMarket
            && self.book.quote().ops.iter().any(|o| {
                o.kind == OperationKind::DeleteQuote && o.state == OperationState::Queued
            })
        {
            self.book.set_state(quote_id, OrderState::OnMarket);
        }
        self.dispatch(quote_id, op)
    }

    /// Retire the quote's market interest. The singleton itself always
    /// survives and can be re-quoted later.
    pub fn delete_quote(&mut self) -> Submission {
        let quote_id = self.book.quote().id;
        match self.book.quote().state {
            OrderState::PriorToMarket => {
                // Nothing of the quote ever reached the market: drop any
                // queued insert locally and emit nothing.
                self.throttle.evict(quote_id);
                self.book
                    .quote_mut()
                    .ops
                    .retain(|op| op.state != OperationState::Queued);
                debug!("quote delete with nothing at the market");
                Submission::Discarded { order: quote_id }
            }
            OrderState::DeleteSentToMarket => {
                debug!("quote delete already in flight");
                Submission::Discarded { order: quote_id }
            }
            _ => {
                let op = self.book.append_quote_delete();
                info!("quote delete");
                self.throttle.evict(quote_id);
                self.book.conflate_queued(quote_id, op);
                self.book.set_state(quote_id, OrderState::DeleteSentToMarket);
                self.dispatch(quote_id, op)
            }
        }
    }

    // === Queue flushing ===

    /// Flush the throttle queue with a policy-drawn window.
    pub fn flush(&mut self) -> Vec<OpId> {
        if self.throttle.is_empty() {
            return Vec::new();
        }
        let window = self.policy.flush_window();
        self.flush_window(window)
    }

    /// Flush the throttle queue with an explicit window.
    pub fn flush_window(&mut self, window: usize) -> Vec<OpId> {
        let released = self.throttle.drain(window);
        let mut out = Vec::with_capacity(released.len());
        for (owner, op) in released {
            debug!(%op, "operation popped from throttle");
            self.release(owner, op);
            out.push(op);
        }
        out
    }

    // === Acknowledgements ===

    /// Ack up to a policy-drawn number of sent operations, in the
    /// book's chain order.
    pub fn process_acks(&mut self) -> Vec<OpId> {
        let budget = self.policy.ack_budget();
        self.process_acks_with_budget(budget)
    }

    /// Ack up to `budget` sent operations, in the book's chain order.
    pub fn process_acks_with_budget(&mut self, budget: usize) -> Vec<OpId> {
        let targets = self.book.sent_ops(budget);
        for op in &targets {
            self.book.apply_ack(*op);
        }
        targets
    }

    /// Apply one ack from an external stream, in whatever order the
    /// market produced it.
    pub fn ack_operation(&mut self, op: OpId) {
        self.book.apply_ack(op);
    }

    // === Maintenance ===

    /// Prune finalised orders and acked quote history past the
    /// configured thresholds.
    pub fn collect_garbage(&mut self) {
        let pruned = self.book.gc_finalised(self.config.order_gc_threshold);
        if pruned > 0 {
            info!(pruned, "pruned finalised orders");
        }
        let trimmed = self.book.gc_quote_ops(
            self.config.quote_ops_gc_threshold,
            self.config.quote_ops_gc_keep_tail,
        );
        if trimmed > 0 {
            info!(trimmed, "trimmed acked quote operations");
        }
    }

    // === Internals ===

    fn dispatch(&mut self, owner: OrderId, op: OpId) -> Submission {
        if self.throttle.window_open(&mut *self.policy) {
            self.release(owner, op);
            Submission::Released { order: owner, op }
        } else {
            debug!("throttle closed");
            self.enqueue(owner, op);
            Submission::Queued { order: owner, op }
        }
    }

    fn enqueue(&mut self, owner: OrderId, op: OpId) {
        let kind = self
            .book
            .ops(owner)
            .and_then(|ops| ops.iter().find(|o| o.id == op))
            .map(|o| o.kind)
            .unwrap_or_else(|| panic!("enqueue for unknown operation {op}"));
        self.throttle.push(owner, op, kind);

        let ops = self
            .book
            .ops_mut(owner)
            .unwrap_or_else(|| panic!("enqueue for unknown order {owner}"));
        let target = ops
            .iter_mut()
            .find(|o| o.id == op)
            .expect("queued operation present in its chain");
        target.state = OperationState::Queued;
        self.book.conflate_queued(owner, op);
    }

    /// Send one operation to the market: state transitions, the mirror
    /// delta, then the sink.
    fn release(&mut self, owner: OrderId, op_id: OpId) {
        let side = self.book.order(owner).map(|o| o.side);
        let ops = self
            .book
            .ops_mut(owner)
            .unwrap_or_else(|| panic!("release for unknown order {owner}"));
        let idx = ops
            .iter()
            .position(|o| o.id == op_id)
            .unwrap_or_else(|| panic!("release for unknown operation {op_id}"));
        let kind = ops[idx].kind;
        let previous = ops[idx].previous;
        let snapshot = ops[idx].snapshot;

        if kind == OperationKind::AmendOrder {
            if let Some(prev) = previous {
                debug_assert!(
                    ops.iter()
                        .find(|o| o.id == prev)
                        .map_or(true, |o| o.state != OperationState::Queued),
                    "amend released while its predecessor is still queued"
                );
            }
        }
        ops[idx].state = OperationState::SentToMarket;

        let payload = match snapshot {
            OpSnapshot::Single { price, qty } => MarketPayload::Single {
                side: side.unwrap_or_else(|| {
                    panic!("single-order operation {op_id} owned by the quote singleton")
                }),
                price,
                qty,
            },
            OpSnapshot::Quote(shape) => MarketPayload::Quote(shape),
        };
        let descriptor = MarketOperation {
            op: op_id,
            order: owner,
            kind,
            previous,
            payload,
        };

        self.book.set_state(
            owner,
            if kind.is_delete() {
                OrderState::DeleteSentToMarket
            } else {
                OrderState::OnMarket
            },
        );
        info!(op = %descriptor, "operation sent to market");
        self.mirror.apply(&descriptor);
        self.sink.send(&descriptor);
    }

    fn check_operable(&self, order: OrderId) {
        let Some(target) = self.book.order(order) else {
            panic!("operation on unknown order {order}");
        };
        if !target.state.is_live() {
            error!(order = %target, "operation on a dead order");
            panic!("operation on order {order} in state {}", target.state);
        }
    }
}
