// ============================================================================
// HTTP API
// ============================================================================
//
// Thin actix-web shell over the order command handler, the order store and
// the statistics aggregator.
//
// ============================================================================

mod errors;
mod handlers;

use actix_web::web;
use std::sync::Arc;

use crate::domain::order::OrderCommandHandler;
use crate::metrics::Metrics;
use crate::store::OrderStore;

pub use errors::ApiError;

pub struct AppState {
    pub orders: Arc<OrderCommandHandler>,
    pub store: Arc<dyn OrderStore>,
    pub metrics: Arc<Metrics>,
}

/// Register every public route, under both the English paths and the
/// Portuguese ones (`/vendas`, `/estatisticas`, `/saude`) the existing
/// frontend calls.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::InvalidPayload(err.to_string()).into()),
    );

    for (orders, order, statistics, health) in [
        ("/orders", "/orders/{id}", "/statistics", "/health"),
        ("/vendas", "/vendas/{id}", "/estatisticas", "/saude"),
    ] {
        cfg.route(orders, web::get().to(handlers::list_orders))
            .route(orders, web::post().to(handlers::create_order))
            .route(order, web::get().to(handlers::get_order))
            .route(statistics, web::get().to(handlers::statistics))
            .route(health, web::get().to(handlers::health));
    }
}
