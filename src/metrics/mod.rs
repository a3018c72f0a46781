// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order creation (successes, classified failures, validation latency)
// - Remote customer/product lookups
// - Statistics computations
// - Detached background tasks (whose failures never reach a caller)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Metrics
    pub orders_created: IntCounter,
    pub order_failures: IntCounterVec,
    pub validation_duration: HistogramVec,

    // Remote Lookup Metrics
    pub remote_lookups: IntCounterVec,

    // Statistics Metrics
    pub statistics_computed: IntCounter,

    // Background Task Metrics
    pub background_tasks: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Metrics
        let orders_created = IntCounter::new(
            "orders_created_total",
            "Total orders validated and persisted",
        )?;
        registry.register(Box::new(orders_created.clone()))?;

        let order_failures = IntCounterVec::new(
            Opts::new("order_failures_total", "Total order creations rejected"),
            &["reason"],
        )?;
        registry.register(Box::new(order_failures.clone()))?;

        let validation_duration = HistogramVec::new(
            HistogramOpts::new(
                "order_validation_duration_seconds",
                "Time spent waiting for customer and product lookups",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(validation_duration.clone()))?;

        // Remote Lookup Metrics
        let remote_lookups = IntCounterVec::new(
            Opts::new("remote_lookups_total", "Remote customer/product lookups"),
            &["service", "outcome"],
        )?;
        registry.register(Box::new(remote_lookups.clone()))?;

        // Statistics Metrics
        let statistics_computed = IntCounter::new(
            "statistics_computed_total",
            "Total order statistics snapshots computed",
        )?;
        registry.register(Box::new(statistics_computed.clone()))?;

        // Background Task Metrics
        let background_tasks = IntCounterVec::new(
            Opts::new("background_tasks_total", "Detached post-commit tasks by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(background_tasks.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            order_failures,
            validation_duration,
            remote_lookups,
            statistics_computed,
            background_tasks,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a rejected order
    pub fn record_order_failure(&self, reason: &str) {
        self.order_failures.with_label_values(&[reason]).inc();
    }

    /// Helper to record how long the validation race took
    pub fn record_validation(&self, outcome: &str, duration_secs: f64) {
        self.validation_duration.with_label_values(&[outcome]).observe(duration_secs);
    }

    /// Helper to record a remote lookup outcome
    pub fn record_lookup(&self, service: &str, outcome: &str) {
        self.remote_lookups.with_label_values(&[service, outcome]).inc();
    }

    /// Helper to record a background task outcome
    pub fn record_background_task(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.background_tasks.with_label_values(&[outcome]).inc();
    }
}
