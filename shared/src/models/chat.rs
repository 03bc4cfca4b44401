//! Chat Session Models

use serde::{Deserialize, Serialize};

/// Conversation identifier assigned by the backend
pub type SessionId = i64;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    /// End user chatting with the restaurant
    Customer,
    /// Automated agent replies
    Bot,
    /// Restaurant staff member
    Staff,
    /// Role string this client does not know; kept rather than rejected
    #[serde(other)]
    Unknown,
}

/// A single message in a chat session.
///
/// Immutable once received. The server owns the log order; `sent_at` is
/// display-only and never used to re-sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub session_id: SessionId,
    pub author: AuthorRole,
    pub content: String,
    /// Unix millis, display formatting only
    pub sent_at: i64,
}

/// Chat session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Chat session entity (one conversation per customer visit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    pub restaurant_id: i64,
    pub status: SessionStatus,
    pub created_at: i64,
    pub last_message_at: Option<i64>,
}
