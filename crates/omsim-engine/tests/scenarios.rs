//! End-to-end scenarios for the order manager.
//!
//! Each test drives the full path: cross check, throttle queue, release,
//! market mirror, acks. Policies are pinned so every scenario is
//! deterministic.

use omsim_book::CrossReason;
use omsim_core::{
    OperationKind, OperationState, OrderId, OrderState, Price, Qty, QuoteLeg, QuoteShape, Side,
    SimConfig,
};
use omsim_engine::{FixedPolicy, OrderManager, RecordingSink, Submission};

fn manager(policy: FixedPolicy) -> OrderManager<RecordingSink> {
    OrderManager::new(SimConfig::default(), Box::new(policy), RecordingSink::new())
}

fn two_sided(bid: u32, ask: u32) -> QuoteShape {
    QuoteShape::two_sided(
        QuoteLeg::new(Price::new(bid), Qty::new(50)),
        QuoteLeg::new(Price::new(ask), Qty::new(20)),
    )
}

/// Insert, release and ack one order on a wide-open manager.
fn acked_order(
    mgr: &mut OrderManager<RecordingSink>,
    side: Side,
    price: u32,
    qty: u32,
) -> OrderId {
    let result = mgr.insert_order(side, Price::new(price), Qty::new(qty));
    let order = result.order().expect("insert accepted");
    assert!(result.is_released());
    mgr.process_acks_with_budget(usize::MAX);
    assert_eq!(mgr.book().order(order).unwrap().state, OrderState::OnMarket);
    order
}

/// Insert via the queue, flush, ack: one order on market under a shut
/// throttle.
fn acked_order_through_queue(
    mgr: &mut OrderManager<RecordingSink>,
    side: Side,
    price: u32,
    qty: u32,
) -> OrderId {
    let result = mgr.insert_order(side, Price::new(price), Qty::new(qty));
    let order = result.order().expect("insert accepted");
    assert!(result.is_queued());
    mgr.flush_window(usize::MAX);
    mgr.process_acks_with_budget(usize::MAX);
    order
}

#[test]
fn test_self_cross_blocked_on_equal_price() {
    let mut mgr = manager(FixedPolicy::wide_open());
    acked_order(&mut mgr, Side::Buy, 5, 10);

    let orders_before = mgr.book().len();
    let mirror_before = mgr.mirror().len();

    let result = mgr.insert_order(Side::Sell, Price::new(5), Qty::new(10));

    assert!(result.is_rejected());
    assert_eq!(mgr.book().len(), orders_before);
    assert_eq!(mgr.mirror().len(), mirror_before);
}

#[test]
fn test_self_cross_blocked_through_unacked_amend() {
    let mut mgr = manager(FixedPolicy::wide_open());
    let buy = acked_order(&mut mgr, Side::Buy, 3, 10);

    // Amend to 6 released but not acked: the buy may rest at 3 or 6.
    let amend = mgr.amend_order(buy, Price::new(6), Qty::new(10));
    assert!(amend.is_released());

    let result = mgr.insert_order(Side::Sell, Price::new(5), Qty::new(10));
    assert_eq!(
        result,
        Submission::Rejected {
            reason: CrossReason::AgainstOrder { other: buy }
        }
    );
}

#[test]
fn test_conflation_keeps_only_the_newest_amend() {
    let mut mgr = manager(FixedPolicy::shut());
    let order = acked_order_through_queue(&mut mgr, Side::Buy, 5, 10);
    let insert_op = mgr.book().order(order).unwrap().ops[0].id;

    mgr.amend_order(order, Price::new(4), Qty::new(10));
    mgr.amend_order(order, Price::new(7), Qty::new(10));
    let last = mgr.amend_order(order, Price::new(2), Qty::new(10));
    let Submission::Queued { op: last_op, .. } = last else {
        panic!("expected the amend to queue, got {last:?}");
    };

    // One queue slot for the order, holding the newest amend.
    let queued: Vec<_> = mgr.throttle().entries().collect();
    assert_eq!(queued, vec![(order, last_op)]);

    // The chain holds the acked insert and the surviving amend, whose
    // previous pointer walked back to the insert.
    let chain = &mgr.book().order(order).unwrap().ops;
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[1].id, last_op);
    assert_eq!(chain[1].previous, Some(insert_op));
    assert_eq!(chain[1].price(), Some(Price::new(2)));
    assert_eq!(chain[1].state, OperationState::Queued);
}

#[test]
fn test_flush_releases_deletes_before_amends() {
    let mut mgr = manager(FixedPolicy::shut());
    let a = acked_order_through_queue(&mut mgr, Side::Buy, 2, 10);
    let c = acked_order_through_queue(&mut mgr, Side::Buy, 3, 10);
    let d = acked_order_through_queue(&mut mgr, Side::Buy, 4, 10);

    mgr.amend_order(a, Price::new(2), Qty::new(20));
    mgr.insert_order(Side::Buy, Price::new(1), Qty::new(10));
    let delete = mgr.delete_order(c);
    let Submission::Queued { op: delete_op, .. } = delete else {
        panic!("expected the delete to queue, got {delete:?}");
    };
    let amend_d = mgr.amend_order(d, Price::new(4), Qty::new(30));
    let Submission::Queued { op: amend_d_op, .. } = amend_d else {
        panic!("expected the amend to queue, got {amend_d:?}");
    };

    let released = mgr.flush_window(2);

    // The delete leaves first, then the newest of the rest.
    assert_eq!(released, vec![delete_op, amend_d_op]);
    assert_eq!(mgr.throttle().len(), 2);
}

#[test]
fn test_pre_market_delete_never_touches_the_wire() {
    let mut mgr = manager(FixedPolicy::shut());
    let result = mgr.insert_order(Side::Buy, Price::new(5), Qty::new(10));
    let order = result.order().unwrap();
    assert!(result.is_queued());

    let deleted = mgr.delete_order(order);

    assert_eq!(deleted, Submission::Discarded { order });
    assert!(mgr.book().order(order).is_none());
    assert!(mgr.throttle().is_empty());
    assert!(mgr.sink().is_empty());
}

#[test]
fn test_rejected_amend_escalates_to_delete() {
    let mut mgr = manager(FixedPolicy::wide_open());
    let buy = acked_order(&mut mgr, Side::Buy, 4, 10);
    acked_order(&mut mgr, Side::Sell, 8, 10);

    let result = mgr.amend_order(buy, Price::new(9), Qty::new(10));
    assert!(result.is_rejected());

    // The rejected amend is gone and a delete went out in its place,
    // within the same action.
    let order = mgr.book().order(buy).unwrap();
    assert_eq!(order.state, OrderState::DeleteSentToMarket);
    let tail = order.ops.last().unwrap();
    assert_eq!(tail.kind, OperationKind::DeleteOrder);
    assert_eq!(tail.state, OperationState::SentToMarket);
    let last_sent = mgr.sink().sent.last().unwrap();
    assert_eq!(last_sent.kind, OperationKind::DeleteOrder);
    assert_eq!(last_sent.order, buy);

    mgr.process_acks_with_budget(usize::MAX);
    assert_eq!(mgr.book().order(buy).unwrap().state, OrderState::Finalised);
}

#[test]
fn test_flush_with_wide_window_drains_everything() {
    let mut mgr = manager(FixedPolicy::shut());
    let mut orders = Vec::new();
    for price in [2, 3, 4] {
        let result = mgr.insert_order(Side::Buy, Price::new(price), Qty::new(10));
        orders.push(result.order().unwrap());
    }
    assert_eq!(mgr.throttle().len(), 3);

    let released = mgr.flush_window(usize::MAX);

    assert_eq!(released.len(), 3);
    assert!(mgr.throttle().is_empty());
    for order in orders {
        let tail = mgr.book().order(order).unwrap().ops.last().unwrap().state;
        assert_eq!(tail, OperationState::SentToMarket);
    }
}

#[test]
fn test_insert_then_amend_replaces_mirror_entry() {
    let mut mgr = manager(FixedPolicy::wide_open());
    let result = mgr.insert_order(Side::Buy, Price::new(5), Qty::new(10));
    let order = result.order().unwrap();

    let resting = mgr.sink().sent.last().unwrap().clone();
    assert_eq!(resting.previous, None);
    assert!(mgr.mirror().contains(resting.op));
    assert_eq!(mgr.mirror().bids().get(&Price::new(5)), Some(&10));

    mgr.amend_order(order, Price::new(6), Qty::new(20));

    assert_eq!(mgr.mirror().len(), 1);
    assert!(!mgr.mirror().contains(resting.op));
    assert_eq!(mgr.mirror().bids().get(&Price::new(6)), Some(&20));
    assert!(mgr.mirror().bids().get(&Price::new(5)).is_none());
}

#[test]
fn test_pre_market_amend_conflates_the_insert_away() {
    let mut mgr = manager(FixedPolicy::shut());
    let result = mgr.insert_order(Side::Buy, Price::new(5), Qty::new(10));
    let order = result.order().unwrap();

    let amended = mgr.amend_order(order, Price::new(6), Qty::new(10));
    let Submission::Queued { op: amend_op, .. } = amended else {
        panic!("expected the amend to queue, got {amended:?}");
    };

    // The queued insert was superseded entirely: the amend is the
    // order's first market contact and claims no predecessor.
    let chain = &mgr.book().order(order).unwrap().ops;
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].id, amend_op);
    assert_eq!(chain[0].previous, None);

    // Releasing it must rest interest without tripping the mirror.
    mgr.flush_window(usize::MAX);
    assert_eq!(mgr.mirror().len(), 1);
    assert_eq!(mgr.mirror().bids().get(&Price::new(6)), Some(&10));
}

#[test]
fn test_quote_conflation_under_shut_throttle() {
    let mut mgr = manager(FixedPolicy::shut());
    mgr.quote(two_sided(2, 7));
    let second = mgr.quote(two_sided(3, 8));
    let Submission::Queued { op: second_op, .. } = second else {
        panic!("expected the quote to queue, got {second:?}");
    };

    assert_eq!(mgr.throttle().len(), 1);
    let chain = &mgr.book().quote().ops;
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].id, second_op);
    assert_eq!(chain[0].previous, None);
}

#[test]
fn test_quote_rejected_when_crossing_resting_order() {
    let mut mgr = manager(FixedPolicy::wide_open());
    let buy = acked_order(&mut mgr, Side::Buy, 5, 10);

    // Ask at 5 would collide with the resting buy.
    let result = mgr.quote(two_sided(2, 5));
    assert_eq!(
        result,
        Submission::Rejected {
            reason: CrossReason::AgainstOrder { other: buy }
        }
    );
    // The rejected operation left no trace on the quote chain.
    assert!(mgr.book().quote().ops.is_empty());

    // Strictly outside the buy it passes.
    assert!(mgr.quote(two_sided(2, 6)).is_released());
}

#[test]
fn test_insert_rejected_against_projected_quote_ask() {
    let mut mgr = manager(FixedPolicy::wide_open());
    mgr.quote(two_sided(3, 6));

    let result = mgr.insert_order(Side::Buy, Price::new(6), Qty::new(10));
    assert_eq!(
        result,
        Submission::Rejected {
            reason: CrossReason::AgainstQuote {
                level: Price::new(6)
            }
        }
    );

    assert!(mgr
        .insert_order(Side::Buy, Price::new(2), Qty::new(10))
        .is_released());
}

#[test]
fn test_delete_quote_round_trip_preserves_singleton() {
    let mut mgr = manager(FixedPolicy::wide_open());
    mgr.quote(two_sided(3, 6));
    mgr.process_acks_with_budget(usize::MAX);

    let result = mgr.delete_quote();
    assert!(result.is_released());
    assert!(mgr.mirror().is_empty());

    mgr.process_acks_with_budget(usize::MAX);

    // The singleton survives its delete and can be re-quoted.
    assert_ne!(mgr.book().quote().state, OrderState::Finalised);
    assert!(mgr.quote(two_sided(2, 7)).is_released());
    assert_eq!(mgr.mirror().len(), 1);
}

#[test]
fn test_queued_quote_delete_superseded_by_requote() {
    let mut mgr = manager(FixedPolicy::shut());

    // First quote resting and acked.
    mgr.quote(two_sided(3, 6));
    mgr.flush_window(usize::MAX);
    mgr.process_acks_with_budget(usize::MAX);
    assert_eq!(mgr.mirror().len(), 1);

    // Delete queued, then a fresh quote conflates it away: the
    // singleton is no longer departing.
    assert!(mgr.delete_quote().is_queued());
    assert!(mgr.quote(two_sided(2, 7)).is_queued());
    assert_eq!(mgr.book().quote().state, OrderState::OnMarket);

    // A delete after that must still work end to end.
    assert!(mgr.delete_quote().is_queued());
    mgr.flush_window(usize::MAX);
    assert!(mgr.mirror().is_empty());
}

#[test]
fn test_ack_budget_is_respected() {
    let mut mgr = manager(FixedPolicy::wide_open());
    for price in [2, 3, 4] {
        mgr.insert_order(Side::Buy, Price::new(price), Qty::new(10));
    }

    let acked = mgr.process_acks_with_budget(2);
    assert_eq!(acked.len(), 2);

    let acked = mgr.process_acks_with_budget(2);
    assert_eq!(acked.len(), 1);

    assert!(mgr.process_acks_with_budget(2).is_empty());
}
