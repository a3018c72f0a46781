use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, StoreError};
use crate::domain::order::Order;
use crate::health::{ComponentHealth, HealthStatus};

/// Fallback store used when no database is configured.
///
/// Many concurrent readers, one exclusive writer. The lock is never held
/// across an await on anything else, so there is no reentrancy.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn append(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        orders.push(order.clone());

        tracing::debug!(order_id = %order.id, stored = orders.len(), "Appended order to in-memory store");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let mut snapshot = self.orders.read().await.clone();
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(snapshot)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|order| order.id == id).cloned())
    }

    async fn check_health(&self) -> ComponentHealth {
        ComponentHealth::new("order_store", HealthStatus::Healthy).with_details("in-memory")
    }
}
