// ============================================================================
// Order Domain - Validation, Pricing and Creation of Sales Orders
// ============================================================================
//
// - Value objects (LineRequest, OrderLine, OrderStatus)
// - Commands (CreateOrder)
// - Errors (OrderError enum)
// - Aggregate (Order with pricing rules)
// - Command Handler (OrderCommandHandler: lookup race, persistence, finalizer)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
