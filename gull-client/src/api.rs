//! Backend API contract
//!
//! The sync feeds and the mutation coordinator talk to the backend through
//! this trait only, so tests substitute an in-process implementation the
//! same way a different transport would slot in.

use async_trait::async_trait;

use crate::error::ClientResult;
use shared::models::{ChatMessage, ChatSession, Reservation, SessionId};

/// Backend operations the chat core depends on.
///
/// All methods are stateless request/response calls; errors are transport
/// or HTTP failures surfaced as [`crate::ClientError`]. None of them retry.
#[async_trait]
pub trait ChatApi: Send + Sync + std::fmt::Debug {
    /// Full message log of a session, already normalized to a plain list.
    async fn fetch_messages(&self, session_id: SessionId) -> ClientResult<Vec<ChatMessage>>;

    /// Send a message into a session. Returns the backend's opaque receipt.
    async fn send_message(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> ClientResult<serde_json::Value>;

    /// Close a session. Returns the backend's opaque receipt.
    async fn close_session(&self, session_id: SessionId) -> ClientResult<serde_json::Value>;

    /// Reservations currently linked to a session.
    async fn fetch_reservations(&self, session_id: SessionId) -> ClientResult<Vec<Reservation>>;

    /// Chat session directory for the authenticated restaurant.
    async fn fetch_sessions(&self) -> ClientResult<Vec<ChatSession>>;
}
