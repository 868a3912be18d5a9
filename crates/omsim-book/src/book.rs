//! The owning order store.
//!
//! `OrderBook` exclusively owns every order and, through them, every
//! operation. External collections (throttle queue, market mirror) hold
//! ids only, so pruning finalised orders here can never dangle a
//! reference.

use tracing::{debug, error};

use omsim_core::{
    IdAllocator, OpId, OperationKind, OperationState, OrderId, OrderState, Price, Qty, QuoteShape,
    Side,
};

use crate::order::{OpSnapshot, Operation, Order, QuoteBook};

/// The collection of all client-side orders plus the quote singleton.
#[derive(Debug)]
pub struct OrderBook {
    orders: Vec<Order>,
    quote: QuoteBook,
    ids: IdAllocator,
}

impl OrderBook {
    /// Create an empty book. The quote singleton exists from the start.
    #[must_use]
    pub fn new() -> Self {
        let mut ids = IdAllocator::new();
        let quote = QuoteBook {
            id: ids.order_id(),
            state: OrderState::PriorToMarket,
            ops: Vec::new(),
        };
        Self {
            orders: Vec::new(),
            quote,
            ids,
        }
    }

    // === Accessors ===

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn order_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn quote(&self) -> &QuoteBook {
        &self.quote
    }

    pub fn quote_mut(&mut self) -> &mut QuoteBook {
        &mut self.quote
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Operation chain for any owner, the quote singleton included.
    pub fn ops(&self, owner: OrderId) -> Option<&[Operation]> {
        if owner == self.quote.id {
            Some(&self.quote.ops)
        } else {
            self.order(owner).map(|o| o.ops.as_slice())
        }
    }

    /// Mutable operation chain for any owner.
    pub fn ops_mut(&mut self, owner: OrderId) -> Option<&mut Vec<Operation>> {
        if owner == self.quote.id {
            Some(&mut self.quote.ops)
        } else {
            self.order_mut(owner).map(|o| &mut o.ops)
        }
    }

    /// Set the lifecycle state of any owner.
    ///
    /// # Panics
    /// Panics if `owner` is unknown.
    pub fn set_state(&mut self, owner: OrderId, state: OrderState) {
        if owner == self.quote.id {
            self.quote.state = state;
        } else {
            self.order_mut(owner)
                .unwrap_or_else(|| panic!("state change for unknown order {owner}"))
                .state = state;
        }
    }

    /// Conflate the owner's queued operations into `keep` (see
    /// [`Order::conflate_queued`]).
    pub fn conflate_queued(&mut self, owner: OrderId, keep: OpId) {
        if owner == self.quote.id {
            self.quote.conflate_queued(keep);
        } else if let Some(order) = self.order_mut(owner) {
            order.conflate_queued(keep);
        }
    }

    // === Chain construction ===

    /// Create a new order with its initial insert operation.
    pub fn new_order(&mut self, side: Side, price: Price, qty: Qty) -> OrderId {
        let id = self.ids.order_id();
        let op = Operation {
            id: self.ids.op_id(),
            owner: id,
            previous: None,
            kind: OperationKind::InsertOrder,
            state: OperationState::Initial,
            snapshot: OpSnapshot::Single { price, qty },
        };
        self.orders.push(Order {
            id,
            side,
            price,
            qty,
            state: OrderState::PriorToMarket,
            ops: vec![op],
        });
        id
    }

    /// Update an order's intent and append the matching amend operation.
    pub fn append_amend(&mut self, order: OrderId, price: Price, qty: Qty) -> OpId {
        let op_id = self.ids.op_id();
        let target = self
            .order_mut(order)
            .unwrap_or_else(|| panic!("amend for unknown order {order}"));
        target.price = price;
        target.qty = qty;
        let previous = target.last_op_id();
        target.ops.push(Operation {
            id: op_id,
            owner: order,
            previous,
            kind: OperationKind::AmendOrder,
            state: OperationState::Initial,
            snapshot: OpSnapshot::Single { price, qty },
        });
        op_id
    }

    /// Append a delete operation pointing at the order's prior last op.
    pub fn append_delete(&mut self, order: OrderId) -> OpId {
        let op_id = self.ids.op_id();
        let target = self
            .order_mut(order)
            .unwrap_or_else(|| panic!("delete for unknown order {order}"));
        let previous = target.last_op_id();
        let snapshot = OpSnapshot::Single {
            price: target.price,
            qty: target.qty,
        };
        target.ops.push(Operation {
            id: op_id,
            owner: order,
            previous,
            kind: OperationKind::DeleteOrder,
            state: OperationState::Initial,
            snapshot,
        });
        op_id
    }

    /// Append an insert-quote operation to the singleton's chain.
    ///
    /// The previous link points at the chain tail, except across a
    /// delete that already left for the market: the delete cleared the
    /// resting interest, so the supersession chain restarts. A delete
    /// still sitting in the queue keeps the link; conflation rewires it
    /// when the insert takes over the queue slot.
    pub fn append_quote(&mut self, shape: QuoteShape) -> OpId {
        let op_id = self.ids.op_id();
        let previous = match self.quote.ops.last() {
            Some(op)
                if op.kind == OperationKind::DeleteQuote
                    && op.state != OperationState::Queued =>
            {
                None
            }
            Some(op) => Some(op.id),
            None => None,
        };
        self.quote.ops.push(Operation {
            id: op_id,
            owner: self.quote.id,
            previous,
            kind: OperationKind::InsertQuote,
            state: OperationState::Initial,
            snapshot: OpSnapshot::Quote(shape),
        });
        op_id
    }

    /// Append a delete-quote operation to the singleton's chain.
    pub fn append_quote_delete(&mut self) -> OpId {
        let op_id = self.ids.op_id();
        let previous = self.quote.last_op_id();
        self.quote.ops.push(Operation {
            id: op_id,
            owner: self.quote.id,
            previous,
            kind: OperationKind::DeleteQuote,
            state: OperationState::Initial,
            snapshot: OpSnapshot::Quote(QuoteShape::empty()),
        });
        op_id
    }

    /// Drop the tail operation of an order (cross-rejection path).
    pub fn pop_last_op(&mut self, order: OrderId) {
        if let Some(target) = self.order_mut(order) {
            target.ops.pop();
        }
    }

    /// Drop the tail operation of the quote chain (cross-rejection path).
    pub fn pop_last_quote_op(&mut self) {
        self.quote.ops.pop();
    }

    /// Remove an order (and its operations) from the book entirely.
    pub fn remove_order(&mut self, id: OrderId) {
        self.orders.retain(|o| o.id != id);
    }

    // === Acknowledgement ===

    /// Ids of up to `budget` sent-but-unacked operations, in the book's
    /// ack order: quote singleton first, then each order's chain
    /// chronologically.
    pub fn sent_ops(&self, budget: usize) -> Vec<OpId> {
        let mut out = Vec::new();
        if budget == 0 {
            return out;
        }
        for op in &self.quote.ops {
            if op.state == OperationState::SentToMarket {
                out.push(op.id);
                if out.len() == budget {
                    return out;
                }
            }
        }
        for order in &self.orders {
            if order.state.is_terminal() {
                continue;
            }
            for op in &order.ops {
                if op.state == OperationState::SentToMarket {
                    out.push(op.id);
                    if out.len() == budget {
                        return out;
                    }
                }
            }
        }
        out
    }

    /// Apply a market acknowledgement to one operation.
    ///
    /// Delete acks finalise single orders; the quote singleton is never
    /// finalised, its delete only retires the operation. Any other ack
    /// promotes the owner to `OnMarket` unless a delete is already in
    /// flight.
    ///
    /// # Panics
    /// Panics if the operation is unknown or not in `SentToMarket`.
    pub fn apply_ack(&mut self, op: OpId) {
        if let Some(idx) = self.quote.ops.iter().position(|o| o.id == op) {
            let operation = &mut self.quote.ops[idx];
            Self::check_ackable(operation);
            operation.state = OperationState::Acked;
            let kind = operation.kind;
            debug!(op = %self.quote.ops[idx], "acked quote operation");
            if kind != OperationKind::DeleteQuote && self.quote.state != OrderState::DeleteSentToMarket
            {
                self.quote.state = OrderState::OnMarket;
            }
            return;
        }

        for order in &mut self.orders {
            if let Some(idx) = order.ops.iter().position(|o| o.id == op) {
                let operation = &mut order.ops[idx];
                Self::check_ackable(operation);
                operation.state = OperationState::Acked;
                let kind = operation.kind;
                debug!(op = %order.ops[idx], "acked operation");
                if kind == OperationKind::DeleteOrder {
                    order.state = OrderState::Finalised;
                } else if order.state != OrderState::DeleteSentToMarket {
                    order.state = OrderState::OnMarket;
                }
                return;
            }
        }

        panic!("ack for unknown operation {op}");
    }

    fn check_ackable(operation: &Operation) {
        if operation.state != OperationState::SentToMarket {
            error!(op = %operation, "ack for an operation that was never sent");
            panic!(
                "ack for operation {} in state {}, expected SentToMarket",
                operation.id, operation.state
            );
        }
    }

    // === Garbage collection ===

    /// Prune finalised orders once the book exceeds `threshold`.
    /// Returns the number pruned.
    pub fn gc_finalised(&mut self, threshold: usize) -> usize {
        if self.orders.len() <= threshold {
            return 0;
        }
        let before = self.orders.len();
        self.orders.retain(|o| !o.state.is_terminal());
        before - self.orders.len()
    }

    /// Trim the leading quote operations once the chain exceeds
    /// `threshold`, keeping the last `keep_tail` plus anything not yet
    /// acked at the cut point. Returns the number trimmed.
    pub fn gc_quote_ops(&mut self, threshold: usize, keep_tail: usize) -> usize {
        if self.quote.ops.len() <= threshold {
            return 0;
        }
        let cut = threshold - keep_tail;
        match self.quote.ops.get(cut) {
            Some(op) if op.state.is_acked() => {
                self.quote.ops.drain(..cut);
                cut
            }
            _ => 0,
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
