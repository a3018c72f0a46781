use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod background;
mod clients;
mod config;
mod domain;
mod health;
mod metrics;
mod models;
mod store;

use background::BackgroundFinalizer;
use clients::HttpLookupClient;
use config::Settings;
use domain::order::OrderCommandHandler;
use store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sales_service=debug")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!(
        port = settings.port,
        metrics_port = settings.metrics_port,
        customer_service = %settings.customer_service_url,
        product_service = %settings.product_service_url,
        validation_timeout_ms = settings.validation_timeout.as_millis() as u64,
        "🚀 Starting sales service"
    );

    // === 1. Metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());

    // === 2. Order store (durable when configured) ===
    let store: Arc<dyn OrderStore> = match settings.database_url.as_deref() {
        Some(url) => {
            tracing::info!("Connecting to Postgres...");
            let store = PostgresOrderStore::connect(url).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory only");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. Remote lookups and order orchestration ===
    let lookup = HttpLookupClient::new(
        &settings.customer_service_url,
        &settings.product_service_url,
        settings.http_client_timeout,
    )?
    .with_metrics(metrics.clone());

    let finalizer = BackgroundFinalizer::new(settings.finalizer_delay, metrics.clone());
    let orders = Arc::new(OrderCommandHandler::new(
        Arc::new(lookup),
        store.clone(),
        finalizer,
        metrics.clone(),
        settings.validation_timeout,
    ));

    let state = web::Data::new(api::AppState {
        orders,
        store,
        metrics,
    });

    // === 4. HTTP servers ===
    tracing::info!("💰 Order API on http://0.0.0.0:{}/orders", settings.port);
    tracing::info!("📈 Statistics on http://0.0.0.0:{}/statistics", settings.port);

    let api_server = HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind(("0.0.0.0", settings.port))?
        .run();

    tokio::try_join!(
        api_server,
        metrics::start_metrics_server(metrics_registry, settings.metrics_port),
    )?;

    tracing::info!("🛑 Sales service stopped");
    Ok(())
}
