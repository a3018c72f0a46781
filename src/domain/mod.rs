// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order/      - order creation from remote customer and product data
// - statistics  - aggregate figures over the order history
//
// ============================================================================

pub mod order;
pub mod statistics;
