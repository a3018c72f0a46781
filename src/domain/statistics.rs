use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::domain::order::Order;

// ============================================================================
// Order Statistics
// ============================================================================
//
// Sum, maximum and minimum are reduced by three independent tasks over the
// same read-only slice. The tasks run on the blocking pool, so they execute
// in parallel even when the caller sits on a single-threaded actix worker.
// Each task owns a dedicated oneshot channel, so a result can only ever land
// in the field of the task that produced it, whatever order the tasks finish in.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatistics {
    pub count: usize,
    pub total_value: f64,
    pub average_value: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub computed_at: DateTime<Utc>,
}

impl OrderStatistics {
    pub fn empty() -> Self {
        Self {
            count: 0,
            total_value: 0.0,
            average_value: 0.0,
            max_value: 0.0,
            min_value: 0.0,
            computed_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatisticsError {
    #[error("Statistics worker '{0}' exited without a result")]
    WorkerLost(&'static str),
}

/// Compute count/sum/average/max/min over `orders`
pub async fn compute_statistics(orders: Arc<[Order]>) -> Result<OrderStatistics, StatisticsError> {
    if orders.is_empty() {
        return Ok(OrderStatistics::empty());
    }

    let sum_rx = spawn_reduction(orders.clone(), |orders| {
        orders.iter().fold(0.0, |sum, order| sum + order.total)
    });

    let max_rx = spawn_reduction(orders.clone(), |orders| {
        orders
            .iter()
            .fold(0.0, |max, order| if order.total > max { order.total } else { max })
    });

    let min_rx = spawn_reduction(orders.clone(), |orders| {
        let first = orders[0].total;
        orders
            .iter()
            .fold(first, |min, order| if order.total < min { order.total } else { min })
    });

    // Joined in a fixed order, each receiver bound to its own task
    let total_value = sum_rx.await.map_err(|_| StatisticsError::WorkerLost("sum"))?;
    let max_value = max_rx.await.map_err(|_| StatisticsError::WorkerLost("max"))?;
    let min_value = min_rx.await.map_err(|_| StatisticsError::WorkerLost("min"))?;

    let count = orders.len();

    tracing::debug!(count, total_value, max_value, min_value, "Computed order statistics");

    Ok(OrderStatistics {
        count,
        total_value,
        average_value: total_value / count as f64,
        max_value,
        min_value,
        computed_at: Utc::now(),
    })
}

fn spawn_reduction<F>(orders: Arc<[Order]>, reduce: F) -> oneshot::Receiver<f64>
where
    F: FnOnce(&[Order]) -> f64 + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        // The joiner only drops its receiver when it has already failed
        let _ = tx.send(reduce(&orders));
    });

    rx
}
