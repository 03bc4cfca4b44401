//! Chat mutations
//!
//! The one place a user action reaches the backend and the one place a
//! failure becomes user-facing text. Both operations follow the same
//! discipline: call the API, and only after the success response is
//! observed, invalidate the cache keys whose resources the mutation may
//! have changed. There is no optimistic insertion (a sent message becomes
//! visible once the invalidation-triggered re-fetch returns it) and no
//! automatic retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::api::ChatApi;
use crate::cache::{QueryCache, QueryKey};
use crate::error::ClientError;
use shared::models::SessionId;

/// User-facing notice texts, overridable by the embedding application
#[derive(Debug, Clone)]
pub struct ActionNotices {
    pub send_failed: String,
    pub close_failed: String,
}

impl Default for ActionNotices {
    fn default() -> Self {
        Self {
            send_failed: "Could not send your message. Please try again.".to_string(),
            close_failed: "Could not close the conversation. Please try again.".to_string(),
        }
    }
}

/// Failed mutation: carries the notice text to show and the cause.
///
/// How (and whether) the notice is surfaced is the presentation layer's
/// decision; this crate only supplies it.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{notice}")]
    Send {
        notice: String,
        #[source]
        source: ClientError,
    },

    #[error("{notice}")]
    Close {
        notice: String,
        #[source]
        source: ClientError,
    },
}

impl ActionError {
    /// Text meant for the user
    pub fn notice(&self) -> &str {
        match self {
            ActionError::Send { notice, .. } | ActionError::Close { notice, .. } => notice,
        }
    }

    /// Underlying client error
    pub fn cause(&self) -> &ClientError {
        match self {
            ActionError::Send { source, .. } | ActionError::Close { source, .. } => source,
        }
    }
}

/// Mutation coordinator for one chat context.
///
/// Exposes pending flags so the presentation layer can disable its trigger
/// controls while a request is outstanding; it neither queues nor coalesces
/// concurrent calls; preventing a duplicate submission is the caller's job.
#[derive(Debug, Clone)]
pub struct ChatActions {
    api: Arc<dyn ChatApi>,
    cache: QueryCache,
    notices: Arc<ActionNotices>,
    send_pending: Arc<AtomicBool>,
    close_pending: Arc<AtomicBool>,
}

impl ChatActions {
    pub(crate) fn new(api: Arc<dyn ChatApi>, cache: QueryCache, notices: ActionNotices) -> Self {
        Self {
            api,
            cache,
            notices: Arc::new(notices),
            send_pending: Arc::new(AtomicBool::new(false)),
            close_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A send is currently outstanding
    pub fn send_pending(&self) -> bool {
        self.send_pending.load(Ordering::SeqCst)
    }

    /// A close is currently outstanding
    pub fn close_pending(&self) -> bool {
        self.close_pending.load(Ordering::SeqCst)
    }

    /// Send a message into the session.
    ///
    /// On success the message log and the linked reservations of this
    /// session are invalidated (the backend may create or modify a
    /// reservation as a side effect of a message) and the backend's opaque
    /// receipt is returned. On failure no cache key is touched.
    pub async fn send_message(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> Result<serde_json::Value, ActionError> {
        self.send_pending.store(true, Ordering::SeqCst);
        let result = self.api.send_message(session_id, content).await;
        self.send_pending.store(false, Ordering::SeqCst);

        match result {
            Ok(receipt) => {
                self.cache.invalidate(QueryKey::messages(session_id));
                self.cache.invalidate(QueryKey::reservations(session_id));
                tracing::debug!(session_id, "message sent, session caches invalidated");
                Ok(receipt)
            }
            Err(source) => {
                tracing::error!(session_id, error = %source, "send message failed");
                Err(ActionError::Send {
                    notice: self.notices.send_failed.clone(),
                    source,
                })
            }
        }
    }

    /// Close the session.
    ///
    /// On success the session directory is invalidated so the closed
    /// conversation disappears from (or updates in) any list view; the
    /// per-session keys are left alone. On failure no cache key is touched.
    pub async fn close_session(
        &self,
        session_id: SessionId,
    ) -> Result<serde_json::Value, ActionError> {
        self.close_pending.store(true, Ordering::SeqCst);
        let result = self.api.close_session(session_id).await;
        self.close_pending.store(false, Ordering::SeqCst);

        match result {
            Ok(receipt) => {
                self.cache.invalidate(QueryKey::sessions());
                tracing::debug!(session_id, "session closed, directory invalidated");
                Ok(receipt)
            }
            Err(source) => {
                tracing::error!(session_id, error = %source, "close session failed");
                Err(ActionError::Close {
                    notice: self.notices.close_failed.clone(),
                    source,
                })
            }
        }
    }
}
