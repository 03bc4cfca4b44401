//! Shared types for the Gull client
//!
//! Wire types exchanged with the restaurant-management backend: the unified
//! API response envelope, chat session API DTOs, and data models.

pub mod client;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::ApiResponse;
