use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use uuid::Uuid;

use super::{OrderStore, StoreError};
use crate::domain::order::{Order, OrderLine, OrderStatus};
use crate::health::{ComponentHealth, HealthStatus};

// ============================================================================
// Postgres Order Store
// ============================================================================
//
// Tables:
//   orders      - one row per order header
//   order_lines - priced lines, `position` keeps the request order
//
// The header and its lines are written in a single transaction.
//
// ============================================================================

type HeaderRow = (Uuid, String, String, f64, DateTime<Utc>, String);
type LineRow = (Uuid, String, i32, f64, f64);

pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                customer_id TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                total DOUBLE PRECISION NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS order_lines (
                id UUID PRIMARY KEY,
                order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                product_id TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                unit_price DOUBLE PRECISION NOT NULL,
                subtotal DOUBLE PRECISION NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders (created_at DESC)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_order_lines_order ON order_lines (order_id, position)")
            .execute(&self.pool)
            .await?;

        tracing::info!("✅ Order schema ready");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn append(&self, order: &Order) -> Result<(), StoreError> {
        // Rolled back on drop unless committed
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, customer_name, total, created_at, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(&order.customer_id)
        .bind(&order.customer_name)
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.status.as_str())
        .execute(&mut *tx)
        .await?;

        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, order_id, position, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order.id)
            .bind(position as i32)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            line_count = order.lines.len(),
            "✅ Transactionally persisted order and lines"
        );

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let headers: Vec<HeaderRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, customer_name, total, created_at, status
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.0).collect();
        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT order_id, product_id, quantity, unit_price, subtotal
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(orders = headers.len(), lines = lines.len(), "Loaded orders from database");
        assemble_orders(headers, lines)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let header: Option<HeaderRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, customer_name, total, created_at, status
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT order_id, product_id, quantity, unit_price, subtotal
            FROM order_lines
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assemble_orders(vec![header], lines)?.pop())
    }

    async fn check_health(&self) -> ComponentHealth {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => ComponentHealth::new("order_store", HealthStatus::Healthy).with_details("postgres"),
            Err(e) => {
                tracing::warn!(error = %e, "Order store health check failed");
                ComponentHealth::new("order_store", HealthStatus::Unhealthy(e.to_string()))
                    .with_details("postgres")
            }
        }
    }
}

/// Attach line rows to their headers, keeping header order and line order
fn assemble_orders(headers: Vec<HeaderRow>, lines: Vec<LineRow>) -> Result<Vec<Order>, StoreError> {
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for (order_id, product_id, quantity, unit_price, subtotal) in lines {
        lines_by_order.entry(order_id).or_default().push(OrderLine {
            product_id,
            quantity,
            unit_price,
            subtotal,
        });
    }

    headers
        .into_iter()
        .map(|(id, customer_id, customer_name, total, created_at, status)| {
            let status = OrderStatus::parse(&status).ok_or_else(|| StoreError::Corrupt {
                order_id: id,
                message: format!("unknown status {:?}", status),
            })?;

            Ok(Order {
                id,
                customer_id,
                customer_name,
                lines: lines_by_order.remove(&id).unwrap_or_default(),
                total,
                created_at,
                status,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: Uuid, status: &str) -> HeaderRow {
        (id, "c-1".to_string(), "Maria Santos".to_string(), 179.8, Utc::now(), status.to_string())
    }

    #[test]
    fn test_assemble_orders_groups_lines() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let orders = assemble_orders(
            vec![header(first, "completed"), header(second, "completed")],
            vec![
                (second, "p-3".to_string(), 1, 10.0, 10.0),
                (first, "p-1".to_string(), 1, 89.9, 89.9),
                (first, "p-2".to_string(), 1, 89.9, 89.9),
            ],
        )
        .unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, first);
        assert_eq!(orders[0].lines.len(), 2);
        assert_eq!(orders[0].lines[0].product_id, "p-1");
        assert_eq!(orders[0].lines[1].product_id, "p-2");
        assert_eq!(orders[1].lines[0].product_id, "p-3");
    }

    #[test]
    fn test_assemble_orders_without_lines() {
        let id = Uuid::new_v4();
        let orders = assemble_orders(vec![header(id, "completed")], vec![]).unwrap();
        assert!(orders[0].lines.is_empty());
    }

    #[test]
    fn test_unknown_status_is_corrupt() {
        let id = Uuid::new_v4();
        let result = assemble_orders(vec![header(id, "shipped")], vec![]);
        assert!(matches!(result, Err(StoreError::Corrupt { order_id, .. }) if order_id == id));
    }
}
