// ============================================================================
// Order Store Gateway
// ============================================================================
//
// The validator only needs "append" and "list". The durable Postgres store
// is the source of truth when configured; otherwise an in-process list
// guarded by a reader/writer lock stands in for it.
//
// ============================================================================

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::Order;
use crate::health::ComponentHealth;

pub use memory::InMemoryOrderStore;
pub use postgres::PostgresOrderStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt order row {order_id}: {message}")]
    Corrupt { order_id: Uuid, message: String },
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist the order header and all of its lines atomically
    async fn append(&self, order: &Order) -> Result<(), StoreError>;

    /// All orders, newest first, with their lines
    async fn list(&self) -> Result<Vec<Order>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn check_health(&self) -> ComponentHealth;
}
