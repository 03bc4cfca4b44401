//! Data models
//!
//! Shared between the backend and this client (via API).
//! All IDs are `i64`, assigned server-side.

pub mod chat;
pub mod reservation;

// Re-exports
pub use chat::*;
pub use reservation::*;
