use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::domain::order::{CreateOrder, Order};
use crate::domain::statistics::{compute_statistics, OrderStatistics};
use crate::health::{overall_status, ComponentHealth, HealthStatus};

#[derive(Serialize)]
struct OrderListResponse<'a> {
    orders: &'a [Order],
    statistics: OrderStatistics,
    total: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: HealthStatus,
    service: &'static str,
    timestamp: DateTime<Utc>,
    components: Vec<ComponentHealth>,
}

async fn load_statistics(state: &AppState) -> Result<(Arc<[Order]>, OrderStatistics), ApiError> {
    let orders: Arc<[Order]> = state.store.list().await?.into();
    let statistics = compute_statistics(orders.clone()).await?;
    state.metrics.statistics_computed.inc();
    Ok((orders, statistics))
}

pub(super) async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (orders, statistics) = load_statistics(&state).await?;

    Ok(HttpResponse::Ok().json(OrderListResponse {
        orders: &orders,
        statistics,
        total: orders.len(),
    }))
}

pub(super) async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let raw_id = path.into_inner();
    let id = Uuid::parse_str(&raw_id).map_err(|_| ApiError::OrderNotFound(raw_id.clone()))?;

    match state.store.get(id).await? {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(ApiError::OrderNotFound(raw_id)),
    }
}

pub(super) async fn create_order(
    state: web::Data<AppState>,
    payload: web::Json<CreateOrder>,
) -> Result<HttpResponse, ApiError> {
    let order = state.orders.create_order(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

pub(super) async fn statistics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let (_, statistics) = load_statistics(&state).await?;
    Ok(HttpResponse::Ok().json(statistics))
}

pub(super) async fn health(state: web::Data<AppState>) -> HttpResponse {
    let components = vec![state.store.check_health().await];
    let status = overall_status(&components);

    let mut response = if status.is_unhealthy() {
        HttpResponse::ServiceUnavailable()
    } else {
        HttpResponse::Ok()
    };

    response.json(HealthResponse {
        status,
        service: "sales-service",
        timestamp: Utc::now(),
        components,
    })
}
