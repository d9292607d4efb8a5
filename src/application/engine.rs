use crate::domain::courier::{Courier, CourierPatch, CourierType, NewCourier};
use crate::domain::interval::{self, TimeInterval};
use crate::domain::order::{NewOrder, Order};
use crate::domain::ports::{CourierStoreBox, OrderStoreBox};
use crate::error::{DeliveryError, Result};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Result of an assignment call: the courier's active batch (possibly the
/// pre-existing one) and its assign time when the batch is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    pub order_ids: Vec<u32>,
    pub assign_time: Option<i64>,
}

/// A courier projection enriched with earnings-derived rating.
#[derive(Debug, Clone, PartialEq)]
pub struct CourierInfo {
    pub courier: Courier,
    pub rating: Option<f64>,
}

/// The entry point for all dispatch operations.
///
/// `DispatchEngine` owns the repository ports and performs each operation as
/// one load-compute-store pass over the affected aggregates. The surrounding
/// boundary layer is expected to serialize operations touching the same
/// courier.
pub struct DispatchEngine {
    couriers: CourierStoreBox,
    orders: OrderStoreBox,
}

const SECONDS_PER_HOUR: f64 = 3600.0;

impl DispatchEngine {
    pub fn new(couriers: CourierStoreBox, orders: OrderStoreBox) -> Self {
        Self { couriers, orders }
    }

    /// Registers a batch of couriers. Ids must be unique within the batch
    /// and against the store; the whole batch is validated before any insert
    /// so a duplicate id rejects the batch without partial registration.
    pub async fn add_couriers(&self, batch: Vec<NewCourier>) -> Result<Vec<u32>> {
        let mut seen = BTreeSet::new();
        for courier in &batch {
            if !seen.insert(courier.id) {
                return Err(DeliveryError::ConstraintViolation(format!(
                    "duplicate courier id {} in batch",
                    courier.id
                )));
            }
            if self.couriers.get(courier.id).await?.is_some() {
                return Err(DeliveryError::ConstraintViolation(format!(
                    "courier {} already exists",
                    courier.id
                )));
            }
        }

        let mut ids = Vec::with_capacity(batch.len());
        for courier in batch {
            ids.push(courier.id);
            self.couriers.insert(Courier::new(courier)).await?;
        }
        debug!(count = ids.len(), "registered couriers");
        Ok(ids)
    }

    /// Registers a batch of orders, with the same all-or-nothing id check as
    /// [`add_couriers`](Self::add_couriers).
    pub async fn add_orders(&self, batch: Vec<NewOrder>) -> Result<Vec<u32>> {
        let mut seen = BTreeSet::new();
        for order in &batch {
            if !seen.insert(order.id) {
                return Err(DeliveryError::ConstraintViolation(format!(
                    "duplicate order id {} in batch",
                    order.id
                )));
            }
            if self.orders.get(order.id).await?.is_some() {
                return Err(DeliveryError::ConstraintViolation(format!(
                    "order {} already exists",
                    order.id
                )));
            }
        }

        let mut ids = Vec::with_capacity(batch.len());
        for order in batch {
            ids.push(order.id);
            self.orders.insert(Order::new(order)).await?;
        }
        debug!(count = ids.len(), "registered orders");
        Ok(ids)
    }

    /// Assigns the maximal feasible prefix of available orders to a courier.
    ///
    /// Idempotent while a batch is in progress: if the courier still holds
    /// assigned orders, that exact set (and the original assign time) is
    /// returned and nothing is re-assigned. Otherwise candidates are the free
    /// orders in the courier's regions whose delivery hours overlap the
    /// working hours, taken in ascending weight order (stable by id) until
    /// the first one that would exceed capacity.
    pub async fn assign_orders(&self, courier_id: u32, now: i64) -> Result<AssignmentOutcome> {
        let mut courier = self.require_courier(courier_id).await?;

        let in_progress = self.orders.assigned_to(courier.id).await?;
        if !in_progress.is_empty() {
            return Ok(AssignmentOutcome {
                order_ids: in_progress.iter().map(|order| order.id).collect(),
                assign_time: courier.assign_time,
            });
        }

        let mut candidates: Vec<Order> = self
            .orders
            .free_in_regions(&courier.regions)
            .await?
            .into_iter()
            .filter(|order| interval::matches(&order.delivery_hours, &courier.working_hours))
            .collect();
        // Stable sort: equal weights keep the store's ascending id order,
        // which fits more orders into the capacity budget first.
        candidates.sort_by(|a, b| a.weight.cmp(&b.weight));

        let mut assigned = Vec::new();
        for mut order in candidates {
            if courier.current_weight + order.weight > courier.capacity() {
                // Prefix-greedy: stop at the first overweight candidate
                // instead of skipping past it.
                break;
            }
            order.assign_to(courier.id)?;
            courier.current_weight += order.weight;
            assigned.push(order);
        }

        if assigned.is_empty() {
            return Ok(AssignmentOutcome {
                order_ids: Vec::new(),
                assign_time: None,
            });
        }

        courier.begin_assignment_batch(now);
        debug!(
            courier_id,
            orders = assigned.len(),
            weight = %courier.current_weight,
            "assigned batch"
        );

        for order in &assigned {
            self.orders.store(order.clone()).await?;
        }
        let outcome = AssignmentOutcome {
            order_ids: assigned.iter().map(|order| order.id).collect(),
            assign_time: courier.assign_time,
        };
        self.couriers.store(courier).await?;
        Ok(outcome)
    }

    /// Applies a profile change and reconciles the courier's assignments.
    ///
    /// Changes are applied in a fixed order (type, regions, working hours);
    /// each step releases the assigned orders that became invalid and gives
    /// their weight back, so the returned courier is never overloaded and
    /// never holds an out-of-region or out-of-hours order.
    pub async fn patch_courier(&self, courier_id: u32, patch: CourierPatch) -> Result<Courier> {
        let mut courier = self.require_courier(courier_id).await?;

        if let Some(r#type) = patch.r#type {
            self.reconcile_type(&mut courier, r#type).await?;
        }
        if let Some(regions) = patch.regions {
            self.reconcile_regions(&mut courier, regions).await?;
        }
        if let Some(working_hours) = patch.working_hours {
            self.reconcile_working_hours(&mut courier, working_hours).await?;
        }

        self.couriers.store(courier.clone()).await?;
        Ok(courier)
    }

    /// Shrinking capacity sheds the heaviest assigned orders first, until
    /// the courier fits again or nothing assigned remains.
    async fn reconcile_type(&self, courier: &mut Courier, r#type: CourierType) -> Result<()> {
        courier.r#type = r#type;

        let mut assigned = self.orders.assigned_to(courier.id).await?;
        assigned.sort_by(|a, b| b.weight.cmp(&a.weight));
        for mut order in assigned {
            if !courier.overloaded() {
                break;
            }
            courier.current_weight -= order.weight;
            order.release()?;
            debug!(courier_id = courier.id, order_id = order.id, "released on type change");
            self.orders.store(order).await?;
        }
        Ok(())
    }

    /// Replaces the region set and releases assigned orders that fell
    /// outside it.
    async fn reconcile_regions(&self, courier: &mut Courier, regions: BTreeSet<u32>) -> Result<()> {
        courier.regions = regions;

        for mut order in self.orders.assigned_to(courier.id).await? {
            if !courier.regions.contains(&order.region) {
                courier.current_weight -= order.weight;
                order.release()?;
                debug!(courier_id = courier.id, order_id = order.id, "released on region change");
                self.orders.store(order).await?;
            }
        }
        Ok(())
    }

    /// Replaces the working-hours set and releases assigned orders whose
    /// delivery hours no longer overlap it.
    async fn reconcile_working_hours(
        &self,
        courier: &mut Courier,
        working_hours: Vec<TimeInterval>,
    ) -> Result<()> {
        courier.working_hours = working_hours;

        for mut order in self.orders.assigned_to(courier.id).await? {
            if !interval::matches(&order.delivery_hours, &courier.working_hours) {
                courier.current_weight -= order.weight;
                order.release()?;
                debug!(courier_id = courier.id, order_id = order.id, "released on hours change");
                self.orders.store(order).await?;
            }
        }
        Ok(())
    }

    /// Finalizes one order of the courier's active batch.
    ///
    /// The completion time must not precede the batch's current start time;
    /// on success the start time advances to the completion time so the next
    /// order's lead time is measured from this one. When the last assigned
    /// order completes, the batch pays out and the carried weight resets.
    pub async fn complete_order(
        &self,
        courier_id: u32,
        order_id: u32,
        complete_time: i64,
    ) -> Result<u32> {
        let mut courier = self.require_courier(courier_id).await?;
        let mut order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| DeliveryError::order_not_found(order_id))?;

        if !order.assigned_to(courier.id) {
            return Err(DeliveryError::InvalidTransition(format!(
                "order {order_id} is not assigned to courier {courier_id}"
            )));
        }
        let batch_start = courier.start_time.ok_or_else(|| {
            DeliveryError::InvalidTransition(format!(
                "courier {courier_id} has no active batch"
            ))
        })?;

        order.complete(batch_start, complete_time)?;
        courier.start_time = Some(complete_time);
        self.orders.store(order.clone()).await?;

        let remaining = self.orders.assigned_to(courier.id).await?;
        if remaining.is_empty() {
            courier.earnings += courier.salary;
            courier.current_weight = Decimal::ZERO;
            debug!(
                courier_id,
                earnings = courier.earnings,
                "batch finished, salary paid out"
            );
        }
        self.couriers.store(courier).await?;
        Ok(order.id)
    }

    /// Returns the courier's profile together with its rating, when one is
    /// defined. A rating exists only for couriers that have completed orders
    /// and earned something.
    pub async fn courier_info(&self, courier_id: u32) -> Result<CourierInfo> {
        let courier = self.require_courier(courier_id).await?;

        let rating = if courier.earnings > 0 {
            let completed = self.orders.completed_by(courier.id).await?;
            rating_of(&completed)
        } else {
            None
        };
        Ok(CourierInfo { courier, rating })
    }

    async fn require_courier(&self, courier_id: u32) -> Result<Courier> {
        self.couriers
            .get(courier_id)
            .await?
            .ok_or_else(|| DeliveryError::courier_not_found(courier_id))
    }
}

/// Rating over completed orders: the best (lowest) per-region average lead
/// time, mapped linearly so that an instant delivery scores 5 and anything
/// from one hour up scores 0. Rounded to two decimals.
fn rating_of(completed: &[Order]) -> Option<f64> {
    let mut by_region: HashMap<u32, (i64, u32)> = HashMap::new();
    for order in completed {
        if let Some(lead_time) = order.lead_time {
            let entry = by_region.entry(order.region).or_default();
            entry.0 += lead_time;
            entry.1 += 1;
        }
    }

    let best = by_region
        .values()
        .map(|&(total, count)| total as f64 / count as f64)
        .fold(f64::INFINITY, f64::min);
    if best.is_infinite() {
        return None;
    }

    let rating = (SECONDS_PER_HOUR - best.min(SECONDS_PER_HOUR)) / SECONDS_PER_HOUR * 5.0;
    Some((rating * 100.0).round() / 100.0)
}
