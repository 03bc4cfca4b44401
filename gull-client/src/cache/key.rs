//! Composite cache keys
//!
//! Every cached query is addressed by `(resource kind, session id)`. The
//! session part is `None` for restaurant-wide resources (the session
//! directory) and for disabled per-session subscriptions.

use std::fmt;

use shared::models::SessionId;

/// Kind of backend resource a cache entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Message log of one chat session
    Messages,
    /// Reservations linked to one chat session
    Reservations,
    /// Chat session directory of the restaurant
    Sessions,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Messages => "messages",
            ResourceKind::Reservations => "reservations",
            ResourceKind::Sessions => "sessions",
        }
    }
}

/// Composite cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub session: Option<SessionId>,
}

impl QueryKey {
    /// Key for a session's message log
    pub fn messages(session_id: SessionId) -> Self {
        Self {
            kind: ResourceKind::Messages,
            session: Some(session_id),
        }
    }

    /// Key for a session's linked reservations
    pub fn reservations(session_id: SessionId) -> Self {
        Self {
            kind: ResourceKind::Reservations,
            session: Some(session_id),
        }
    }

    /// Key for the restaurant's session directory
    pub fn sessions() -> Self {
        Self {
            kind: ResourceKind::Sessions,
            session: None,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.session {
            Some(id) => write!(f, "{}:{}", self.kind.as_str(), id),
            None => write!(f, "{}:*", self.kind.as_str()),
        }
    }
}
