use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::order::OrderError;
use crate::domain::statistics::StatisticsError;
use crate::store::StoreError;

// ============================================================================
// API Errors - one HTTP status per failure kind
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Failed to read orders: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Order(e) => order_status(e),
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::OrderNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Statistics(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.to_string() }))
    }
}

fn order_status(error: &OrderError) -> StatusCode {
    match error {
        OrderError::Validation(_) => StatusCode::BAD_REQUEST,
        OrderError::CustomerNotFound { source, .. } | OrderError::ProductNotFound { source, .. } => {
            if source.is_transport() {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        }
        OrderError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
        OrderError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
