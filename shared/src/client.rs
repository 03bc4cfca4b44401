//! Client-related types shared between server and client
//!
//! Common request/response types used in API communication.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, ChatSession, Reservation};

// Re-export ApiResponse from response module
pub use crate::response::ApiResponse;

// =============================================================================
// Auth API DTOs
// =============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

/// User information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

// =============================================================================
// Chat API DTOs
// =============================================================================

/// Send message request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Message history as the backend serves it.
///
/// Deployments running the pre-2024 message service return a bare array;
/// current ones wrap it in an object with a `messages` field. This enum is
/// the one place that tolerance lives; everything above it works with a
/// plain `Vec<ChatMessage>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageHistory {
    Plain(Vec<ChatMessage>),
    Wrapped { messages: Vec<ChatMessage> },
}

impl MessageHistory {
    /// Normalize either wire shape into the message list
    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            MessageHistory::Plain(messages) => messages,
            MessageHistory::Wrapped { messages } => messages,
        }
    }
}

/// Reservations linked to one chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationsResponse {
    pub reservations: Vec<Reservation>,
}

/// Chat session directory for the current restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<ChatSession>,
}
