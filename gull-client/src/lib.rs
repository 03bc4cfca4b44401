//! Gull Client - chat session synchronization for the restaurant backend
//!
//! Keeps a polling-refreshed view of a chat session (messages + linked
//! reservations) consistent with the server-authoritative log, and routes
//! mutations (send, close) through cache invalidation so every view
//! converges on the next refresh.

pub mod actions;
pub mod api;
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod sync;

pub use actions::{ActionError, ActionNotices, ChatActions};
pub use api::ChatApi;
pub use cache::{QueryCache, QueryKey, QueryState, ResourceKind, Subscription};
pub use config::ClientConfig;
pub use context::ChatContext;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use sync::{MessageFeed, ReservationFeed, SessionListFeed};

// Re-export shared types for convenience
pub use shared::client::{ApiResponse, LoginResponse, UserInfo};
pub use shared::models::{
    AuthorRole, ChatMessage, ChatSession, Reservation, SessionId, SessionStatus,
};
