use crate::domain::courier::Courier;
use crate::domain::order::Order;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// Repository seam for courier aggregates.
///
/// `insert` enforces id uniqueness and is used by bulk registration;
/// `store` is an upsert used when an engine persists a mutated aggregate.
#[async_trait]
pub trait CourierStore: Send + Sync {
    async fn insert(&self, courier: Courier) -> Result<()>;
    async fn store(&self, courier: Courier) -> Result<()>;
    async fn get(&self, courier_id: u32) -> Result<Option<Courier>>;
}

/// Repository seam for order aggregates.
///
/// The query methods return orders in ascending id order so the engines'
/// stable sorts are deterministic regardless of the backing store.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;
    async fn store(&self, order: Order) -> Result<()>;
    async fn get(&self, order_id: u32) -> Result<Option<Order>>;
    async fn free_in_regions(&self, regions: &BTreeSet<u32>) -> Result<Vec<Order>>;
    async fn assigned_to(&self, courier_id: u32) -> Result<Vec<Order>>;
    async fn completed_by(&self, courier_id: u32) -> Result<Vec<Order>>;
}

pub type CourierStoreBox = Box<dyn CourierStore>;
pub type OrderStoreBox = Box<dyn OrderStore>;
