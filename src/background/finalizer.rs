use async_trait::async_trait;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::order::Order;
use crate::metrics::Metrics;

// ============================================================================
// Background Finalizer
// ============================================================================
//
// Post-commit work that runs detached from the request. The caller has
// already received its response by the time the hook runs, so failures
// here only ever surface as a log line and a metric.
//
// ============================================================================

/// Downstream work performed once an order has been committed
#[async_trait]
pub trait CompletionHook: Send + Sync {
    async fn on_completed(&self, order: &Order) -> anyhow::Result<()>;
}

/// Default hook: record the completed order in the service log
pub struct LoggingCompletionHook;

#[async_trait]
impl CompletionHook for LoggingCompletionHook {
    async fn on_completed(&self, order: &Order) -> anyhow::Result<()> {
        let summary = serde_json::to_string(&serde_json::json!({
            "order_id": order.id,
            "customer_id": order.customer_id,
            "lines": order.lines.len(),
            "total": order.total,
        }))?;

        tracing::info!(order_id = %order.id, summary = %summary, "Order processed in background");
        Ok(())
    }
}

#[derive(Clone)]
pub struct BackgroundFinalizer {
    delay: Duration,
    hook: Arc<dyn CompletionHook>,
    metrics: Arc<Metrics>,
}

impl BackgroundFinalizer {
    pub fn new(delay: Duration, metrics: Arc<Metrics>) -> Self {
        Self::with_hook(delay, Arc::new(LoggingCompletionHook), metrics)
    }

    pub fn with_hook(delay: Duration, hook: Arc<dyn CompletionHook>, metrics: Arc<Metrics>) -> Self {
        Self { delay, hook, metrics }
    }

    /// Fire-and-forget: spawn the hook and return immediately.
    ///
    /// There is no return channel; the outcome is only observable through
    /// `background_tasks_total` and the log.
    pub fn dispatch(&self, order: Order) {
        let delay = self.delay;
        let hook = self.hook.clone();
        let metrics = self.metrics.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A panicking hook counts as a failure like any other
            let outcome = AssertUnwindSafe(hook.on_completed(&order))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(anyhow::anyhow!("hook panicked: {}", panic_message(&*panic))));

            match outcome {
                Ok(()) => {
                    metrics.record_background_task(true);
                }
                Err(e) => {
                    metrics.record_background_task(false);
                    tracing::error!(
                        order_id = %order.id,
                        error = %e,
                        "Background finalizer failed; caller already answered"
                    );
                }
            }
        });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderLine, OrderStatus};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    struct CountingHook {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl CompletionHook for CountingHook {
        async fn on_completed(&self, _order: &Order) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("inventory service unavailable");
            }
            Ok(())
        }
    }

    struct PanickingHook;

    #[async_trait]
    impl CompletionHook for PanickingHook {
        async fn on_completed(&self, _order: &Order) -> anyhow::Result<()> {
            panic!("label printer exploded");
        }
    }

    fn order() -> Order {
        Order {
            id: Uuid::new_v4(),
            customer_id: "c-1".to_string(),
            customer_name: "João Silva".to_string(),
            lines: vec![OrderLine::priced("p-1", 2, 10.0)],
            total: 20.0,
            created_at: Utc::now(),
            status: OrderStatus::Completed,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_returns_before_hook_runs() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let hook = Arc::new(CountingHook { calls: AtomicU32::new(0), fail: false });
        let finalizer = BackgroundFinalizer::with_hook(Duration::from_millis(50), hook.clone(), metrics.clone());

        finalizer.dispatch(order());
        assert_eq!(hook.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.background_tasks.with_label_values(&["success"]).get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_only_recorded() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let hook = Arc::new(CountingHook { calls: AtomicU32::new(0), fail: true });
        let finalizer = BackgroundFinalizer::with_hook(Duration::from_millis(5), hook.clone(), metrics.clone());

        finalizer.dispatch(order());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.background_tasks.with_label_values(&["failure"]).get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_hook_is_recorded_as_failure() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let finalizer = BackgroundFinalizer::with_hook(Duration::from_millis(1), Arc::new(PanickingHook), metrics.clone());

        finalizer.dispatch(order());
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(metrics.background_tasks.with_label_values(&["failure"]).get(), 1);
        assert_eq!(metrics.background_tasks.with_label_values(&["success"]).get(), 0);
    }

    #[test]
    fn test_panic_message_extraction() {
        let literal: Box<dyn std::any::Any + Send> = Box::new("boom");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn std::any::Any + Send> = Box::new(7u8);

        assert_eq!(panic_message(&*literal), "boom");
        assert_eq!(panic_message(&*owned), "bang");
        assert_eq!(panic_message(&*other), "non-string payload");
    }

    #[tokio::test]
    async fn test_logging_hook_succeeds() {
        assert!(LoggingCompletionHook.on_completed(&order()).await.is_ok());
    }
}
