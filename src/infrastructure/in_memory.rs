use crate::domain::courier::Courier;
use crate::domain::order::Order;
use crate::domain::ports::{CourierStore, OrderStore};
use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for courier aggregates.
///
/// `BTreeMap` keeps scans in ascending id order, which the engines rely on
/// for deterministic candidate ordering.
#[derive(Default, Clone)]
pub struct InMemoryCourierStore {
    couriers: Arc<RwLock<BTreeMap<u32, Courier>>>,
}

impl InMemoryCourierStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourierStore for InMemoryCourierStore {
    async fn insert(&self, courier: Courier) -> Result<()> {
        let mut couriers = self.couriers.write().await;
        if couriers.contains_key(&courier.id) {
            return Err(DeliveryError::ConstraintViolation(format!(
                "courier {} already exists",
                courier.id
            )));
        }
        couriers.insert(courier.id, courier);
        Ok(())
    }

    async fn store(&self, courier: Courier) -> Result<()> {
        let mut couriers = self.couriers.write().await;
        couriers.insert(courier.id, courier);
        Ok(())
    }

    async fn get(&self, courier_id: u32) -> Result<Option<Courier>> {
        let couriers = self.couriers.read().await;
        Ok(couriers.get(&courier_id).cloned())
    }
}

/// A thread-safe in-memory store for order aggregates.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<BTreeMap<u32, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(DeliveryError::ConstraintViolation(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn store(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, order_id: u32) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn free_in_regions(&self, regions: &BTreeSet<u32>) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|order| order.available_for(regions))
            .cloned()
            .collect())
    }

    async fn assigned_to(&self, courier_id: u32) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|order| order.assigned_to(courier_id))
            .cloned()
            .collect())
    }

    async fn completed_by(&self, courier_id: u32) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|order| order.completed_by(courier_id))
            .cloned()
            .collect())
    }
}
