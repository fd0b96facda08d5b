// HTTP API routes
//
// Each submodule handles one concern with its own state.

pub mod common;
pub mod health;
pub mod notifications;

// Re-export common types
pub use common::{ApiError, ErrorResponse};
