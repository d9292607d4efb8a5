//! End-to-end scenarios over the dispatch engine with in-memory stores,
//! checking the invariants that must hold after every operation.

use courier_manager::application::engine::DispatchEngine;
use courier_manager::domain::courier::{CourierPatch, CourierType, NewCourier};
use courier_manager::domain::interval::TimeInterval;
use courier_manager::domain::order::{NewOrder, OrderStatus};
use courier_manager::domain::ports::{CourierStore, OrderStore};
use courier_manager::error::DeliveryError;
use courier_manager::infrastructure::in_memory::{InMemoryCourierStore, InMemoryOrderStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct Harness {
    engine: DispatchEngine,
    couriers: InMemoryCourierStore,
    orders: InMemoryOrderStore,
}

fn harness() -> Harness {
    courier_manager::logging::init_test();
    let couriers = InMemoryCourierStore::new();
    let orders = InMemoryOrderStore::new();
    Harness {
        engine: DispatchEngine::new(Box::new(couriers.clone()), Box::new(orders.clone())),
        couriers,
        orders,
    }
}

fn hours(texts: &[&str]) -> Vec<TimeInterval> {
    texts.iter().map(|t| t.parse().unwrap()).collect()
}

impl Harness {
    async fn courier(&self, id: u32, r#type: CourierType, regions: Vec<u32>, wh: &[&str]) {
        self.engine
            .add_couriers(vec![NewCourier::new(id, r#type, regions, hours(wh)).unwrap()])
            .await
            .unwrap();
    }

    async fn order(&self, id: u32, weight: Decimal, region: u32, dh: &[&str]) {
        self.engine
            .add_orders(vec![NewOrder::new(id, weight, region, hours(dh)).unwrap()])
            .await
            .unwrap();
    }

    /// current_weight must equal the summed weight of the courier's assigned
    /// orders and fit within capacity.
    async fn assert_weight_invariant(&self, courier_id: u32) {
        let courier = self.couriers.get(courier_id).await.unwrap().unwrap();
        let assigned: Decimal = self
            .orders
            .assigned_to(courier_id)
            .await
            .unwrap()
            .iter()
            .map(|o| o.weight)
            .sum();
        assert_eq!(courier.current_weight, assigned);
        assert!(courier.current_weight <= courier.capacity());
    }
}

#[tokio::test]
async fn foot_courier_takes_only_what_fits() {
    let h = harness();
    h.courier(1, CourierType::Foot, vec![1], &["09:00-18:00"]).await;
    h.order(1, dec!(5), 1, &["09:00-12:00"]).await;
    h.order(2, dec!(6), 1, &["09:00-12:00"]).await;

    let outcome = h.engine.assign_orders(1, 0).await.unwrap();
    assert_eq!(outcome.order_ids, vec![1]);
    h.assert_weight_invariant(1).await;
}

#[tokio::test]
async fn type_round_trip_releases_heaviest_order() {
    let h = harness();
    h.courier(1, CourierType::Foot, vec![1], &["09:00-18:00"]).await;
    h.order(1, dec!(6), 1, &["09:00-12:00"]).await;
    h.order(2, dec!(5), 1, &["09:00-12:00"]).await;

    // Upgrade to car first so both orders (total 11) fit in one batch.
    h.engine
        .patch_courier(1, CourierPatch::new(Some(CourierType::Car), None, None).unwrap())
        .await
        .unwrap();
    let outcome = h.engine.assign_orders(1, 0).await.unwrap();
    assert_eq!(outcome.order_ids.len(), 2);

    // Back to foot: capacity 10 < 11, the weight-6 order is released.
    let courier = h
        .engine
        .patch_courier(1, CourierPatch::new(Some(CourierType::Foot), None, None).unwrap())
        .await
        .unwrap();
    assert_eq!(courier.current_weight, dec!(5));

    let released = h.orders.get(1).await.unwrap().unwrap();
    assert_eq!(released.status, OrderStatus::Free);
    h.assert_weight_invariant(1).await;
}

#[tokio::test]
async fn assignment_is_idempotent() {
    let h = harness();
    h.courier(1, CourierType::Bike, vec![1, 2], &["09:00-18:00"]).await;
    h.order(1, dec!(5), 1, &["10:00-11:00"]).await;
    h.order(2, dec!(7), 2, &["10:00-11:00"]).await;

    let first = h.engine.assign_orders(1, 50).await.unwrap();
    let second = h.engine.assign_orders(1, 60).await.unwrap();
    assert_eq!(first.order_ids, second.order_ids);
    assert_eq!(first.assign_time, second.assign_time);
    h.assert_weight_invariant(1).await;
}

#[tokio::test]
async fn earnings_are_monotonic_across_batches() {
    let h = harness();
    h.courier(1, CourierType::Foot, vec![1], &["00:00-23:59"]).await;
    h.order(1, dec!(5), 1, &["00:00-23:59"]).await;

    h.engine.assign_orders(1, 100).await.unwrap();
    h.engine.complete_order(1, 1, 200).await.unwrap();
    let paid_once = h.couriers.get(1).await.unwrap().unwrap().earnings;
    assert_eq!(paid_once, 1000);

    // A second batch pays on top, never subtracting.
    h.order(2, dec!(5), 1, &["00:00-23:59"]).await;
    h.engine.assign_orders(1, 300).await.unwrap();
    h.engine.complete_order(1, 2, 400).await.unwrap();
    let paid_twice = h.couriers.get(1).await.unwrap().unwrap().earnings;
    assert_eq!(paid_twice, 2000);
    assert!(paid_twice >= paid_once);
}

#[tokio::test]
async fn completion_before_batch_start_fails_cleanly() {
    let h = harness();
    h.courier(1, CourierType::Foot, vec![1], &["00:00-23:59"]).await;
    h.order(1, dec!(5), 1, &["00:00-23:59"]).await;
    h.engine.assign_orders(1, 1_000).await.unwrap();

    let result = h.engine.complete_order(1, 1, 900).await;
    assert!(matches!(result, Err(DeliveryError::InvalidTimestamp(_))));

    // Nothing moved: the order is still assigned and counted.
    let order = h.orders.get(1).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Assigned);
    h.assert_weight_invariant(1).await;
}

#[tokio::test]
async fn region_and_hours_changes_keep_weight_consistent() {
    let h = harness();
    h.courier(1, CourierType::Car, vec![1, 2, 3], &["08:00-20:00"]).await;
    h.order(1, dec!(10), 1, &["09:00-10:00"]).await;
    h.order(2, dec!(10), 2, &["12:00-13:00"]).await;
    h.order(3, dec!(10), 3, &["18:00-21:00"]).await;
    h.engine.assign_orders(1, 0).await.unwrap();
    h.assert_weight_invariant(1).await;

    // Drop region 2: order 2 goes back.
    h.engine
        .patch_courier(1, CourierPatch::new(None, Some(vec![1, 3]), None).unwrap())
        .await
        .unwrap();
    h.assert_weight_invariant(1).await;
    assert_eq!(
        h.orders.get(2).await.unwrap().unwrap().status,
        OrderStatus::Free
    );

    // Shrink working hours to mornings: order 3 no longer overlaps.
    h.engine
        .patch_courier(1, CourierPatch::new(None, None, Some(hours(&["08:00-12:00"]))).unwrap())
        .await
        .unwrap();
    h.assert_weight_invariant(1).await;
    assert_eq!(
        h.orders.get(3).await.unwrap().unwrap().status,
        OrderStatus::Free
    );
    assert_eq!(
        h.orders.get(1).await.unwrap().unwrap().status,
        OrderStatus::Assigned
    );
}

#[tokio::test]
async fn combined_patch_applies_type_then_regions_then_hours() {
    let h = harness();
    h.courier(1, CourierType::Car, vec![1, 2], &["08:00-20:00"]).await;
    h.order(1, dec!(30), 1, &["09:00-10:00"]).await;
    h.order(2, dec!(10), 2, &["12:00-13:00"]).await;
    h.engine.assign_orders(1, 0).await.unwrap();

    // One patch: bike (capacity 15) sheds the 30kg order first, then the
    // region change releases order 2, leaving nothing assigned.
    let patch = CourierPatch::new(Some(CourierType::Bike), Some(vec![1]), None).unwrap();
    let courier = h.engine.patch_courier(1, patch).await.unwrap();

    assert_eq!(courier.current_weight, Decimal::ZERO);
    assert_eq!(
        h.orders.get(1).await.unwrap().unwrap().status,
        OrderStatus::Free
    );
    assert_eq!(
        h.orders.get(2).await.unwrap().unwrap().status,
        OrderStatus::Free
    );
    h.assert_weight_invariant(1).await;
}

#[tokio::test]
async fn released_orders_can_be_reassigned_elsewhere() {
    let h = harness();
    h.courier(1, CourierType::Foot, vec![1], &["09:00-18:00"]).await;
    h.courier(2, CourierType::Foot, vec![1], &["09:00-18:00"]).await;
    h.order(1, dec!(5), 1, &["09:00-12:00"]).await;

    h.engine.assign_orders(1, 0).await.unwrap();
    // Courier 1 moves away; the order frees up.
    h.engine
        .patch_courier(1, CourierPatch::new(None, Some(vec![9]), None).unwrap())
        .await
        .unwrap();

    let outcome = h.engine.assign_orders(2, 10).await.unwrap();
    assert_eq!(outcome.order_ids, vec![1]);
    h.assert_weight_invariant(1).await;
    h.assert_weight_invariant(2).await;
}

#[tokio::test]
async fn rating_reflects_best_region() {
    let h = harness();
    h.courier(1, CourierType::Car, vec![1, 2], &["00:00-23:59"]).await;
    h.order(1, dec!(1), 1, &["00:00-23:59"]).await;
    h.order(2, dec!(1), 1, &["00:00-23:59"]).await;
    h.order(3, dec!(1), 2, &["00:00-23:59"]).await;
    h.engine.assign_orders(1, 0).await.unwrap();

    // Region 1 lead times: 600 and 300 (avg 450); region 2: 2700.
    h.engine.complete_order(1, 1, 600).await.unwrap();
    h.engine.complete_order(1, 2, 900).await.unwrap();
    h.engine.complete_order(1, 3, 3_600).await.unwrap();

    let info = h.engine.courier_info(1).await.unwrap();
    let rating = info.rating.unwrap();
    // Best region average is 450s: (3600 - 450) / 3600 * 5 = 4.38
    assert_eq!(rating, 4.38);
    assert!((0.0..=5.0).contains(&rating));
}
