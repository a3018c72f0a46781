// ============================================================================
// Background Tasks
// ============================================================================
//
// Detached work spawned after a request has been answered.
//
// ============================================================================

mod finalizer;

pub use finalizer::{BackgroundFinalizer, CompletionHook, LoggingCompletionHook};
