use crate::domain::interval::TimeInterval;
use crate::error::{DeliveryError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Free,
    Assigned,
    Completed,
}

/// A validated registration command for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: u32,
    pub weight: Decimal,
    pub region: u32,
    pub delivery_hours: Vec<TimeInterval>,
}

impl NewOrder {
    pub fn new(
        id: u32,
        weight: Decimal,
        region: u32,
        delivery_hours: Vec<TimeInterval>,
    ) -> Result<Self> {
        if id == 0 {
            return Err(DeliveryError::ValidationError(
                "order id must be positive".to_string(),
            ));
        }
        if region == 0 {
            return Err(DeliveryError::ValidationError(
                "region must be positive".to_string(),
            ));
        }
        if weight <= Decimal::ZERO || weight > dec!(50) {
            return Err(DeliveryError::ValidationError(format!(
                "weight must be in (0, 50], got {weight}"
            )));
        }
        Ok(Self {
            id,
            weight,
            region,
            delivery_hours,
        })
    }
}

/// An order aggregate with a `free -> assigned -> completed` lifecycle;
/// `assigned -> free` is the only backward edge (release on reconciliation).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    pub id: u32,
    pub weight: Decimal,
    pub region: u32,
    pub status: OrderStatus,
    pub courier_id: Option<u32>,
    pub delivery_hours: Vec<TimeInterval>,
    /// Seconds from batch start to completion, set once on completion.
    pub lead_time: Option<i64>,
}

impl Order {
    pub fn new(order: NewOrder) -> Self {
        Self {
            id: order.id,
            weight: order.weight,
            region: order.region,
            status: OrderStatus::Free,
            courier_id: None,
            delivery_hours: order.delivery_hours,
            lead_time: None,
        }
    }

    /// Hands the order to a courier. Only free orders can be assigned.
    pub fn assign_to(&mut self, courier_id: u32) -> Result<()> {
        if self.status != OrderStatus::Free {
            return Err(DeliveryError::InvalidTransition(format!(
                "order {} is {:?}, expected free",
                self.id, self.status
            )));
        }
        self.status = OrderStatus::Assigned;
        self.courier_id = Some(courier_id);
        Ok(())
    }

    /// Returns the order to the free pool, dropping courier ownership.
    pub fn release(&mut self) -> Result<()> {
        if self.status != OrderStatus::Assigned {
            return Err(DeliveryError::InvalidTransition(format!(
                "order {} is {:?}, expected assigned",
                self.id, self.status
            )));
        }
        self.status = OrderStatus::Free;
        self.courier_id = None;
        Ok(())
    }

    /// Finalizes the order, recording the lead time since batch start.
    /// No state is mutated when the completion time is invalid.
    pub fn complete(&mut self, batch_start: i64, complete_time: i64) -> Result<()> {
        if self.status != OrderStatus::Assigned {
            return Err(DeliveryError::InvalidTransition(format!(
                "order {} is {:?}, expected assigned",
                self.id, self.status
            )));
        }
        if complete_time < batch_start {
            return Err(DeliveryError::InvalidTimestamp(format!(
                "completion time {complete_time} precedes batch start {batch_start}"
            )));
        }
        self.status = OrderStatus::Completed;
        self.lead_time = Some(complete_time - batch_start);
        Ok(())
    }

    /// Whether the order can be handed to a courier working `regions`.
    pub fn available_for(&self, regions: &BTreeSet<u32>) -> bool {
        self.status == OrderStatus::Free && regions.contains(&self.region)
    }

    pub fn assigned_to(&self, courier_id: u32) -> bool {
        self.status == OrderStatus::Assigned && self.courier_id == Some(courier_id)
    }

    pub fn completed_by(&self, courier_id: u32) -> bool {
        self.status == OrderStatus::Completed && self.courier_id == Some(courier_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_order() -> Order {
        Order::new(
            NewOrder::new(1, dec!(5), 7, vec!["09:00-12:00".parse().unwrap()]).unwrap(),
        )
    }

    #[test]
    fn test_assign_release_cycle() {
        let mut order = free_order();
        order.assign_to(3).unwrap();
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.courier_id, Some(3));

        order.release().unwrap();
        assert_eq!(order.status, OrderStatus::Free);
        assert_eq!(order.courier_id, None);
    }

    #[test]
    fn test_assign_requires_free() {
        let mut order = free_order();
        order.assign_to(3).unwrap();
        assert!(matches!(
            order.assign_to(4),
            Err(DeliveryError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_release_requires_assigned() {
        let mut order = free_order();
        assert!(matches!(
            order.release(),
            Err(DeliveryError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_complete_sets_lead_time() {
        let mut order = free_order();
        order.assign_to(3).unwrap();
        order.complete(1_000, 1_450).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.lead_time, Some(450));
        // Completion keeps courier ownership for rating queries
        assert_eq!(order.courier_id, Some(3));
    }

    #[test]
    fn test_complete_rejects_time_before_batch_start() {
        let mut order = free_order();
        order.assign_to(3).unwrap();
        let result = order.complete(1_000, 999);
        assert!(matches!(result, Err(DeliveryError::InvalidTimestamp(_))));
        // Failed completion must not mutate the order
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.lead_time, None);
    }

    #[test]
    fn test_complete_requires_assigned() {
        let mut order = free_order();
        assert!(matches!(
            order.complete(0, 10),
            Err(DeliveryError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_available_for() {
        let order = free_order();
        let regions: BTreeSet<u32> = [7, 9].into_iter().collect();
        assert!(order.available_for(&regions));

        let elsewhere: BTreeSet<u32> = [1, 2].into_iter().collect();
        assert!(!order.available_for(&elsewhere));

        let mut assigned = free_order();
        assigned.assign_to(3).unwrap();
        assert!(!assigned.available_for(&regions));
    }

    #[test]
    fn test_new_order_weight_bounds() {
        assert!(NewOrder::new(1, dec!(0), 1, vec![]).is_err());
        assert!(NewOrder::new(1, dec!(-1), 1, vec![]).is_err());
        assert!(NewOrder::new(1, dec!(50.01), 1, vec![]).is_err());
        assert!(NewOrder::new(1, dec!(0.01), 1, vec![]).is_ok());
        assert!(NewOrder::new(1, dec!(50), 1, vec![]).is_ok());
    }
}
