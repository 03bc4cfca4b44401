//! Session directory feed

use std::sync::Arc;
use std::time::Duration;

use crate::api::ChatApi;
use crate::cache::{QueryCache, QueryKey, QueryState, Subscription};
use crate::error::ClientError;
use shared::models::ChatSession;

/// Polling view of the restaurant's chat session directory.
///
/// Closing a session invalidates this feed's key so the closed conversation
/// drops out of (or updates in) any list view on the next refresh. Strict
/// failure policy, like the message feed.
pub struct SessionListFeed {
    sub: Subscription<Vec<ChatSession>>,
}

impl SessionListFeed {
    pub(crate) fn new(api: Arc<dyn ChatApi>, cache: &QueryCache, interval: Duration) -> Self {
        let sub = cache.subscribe(QueryKey::sessions(), interval, move || {
            let api = api.clone();
            async move { api.fetch_sessions().await }
        });
        Self { sub }
    }

    /// Sessions as the backend last listed them
    pub fn sessions(&self) -> Vec<ChatSession> {
        self.sub.state().data.unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.sub.state().is_loading
    }

    /// Error of the most recent failed fetch, if any
    pub fn error(&self) -> Option<Arc<ClientError>> {
        self.sub.state().error
    }

    /// Full state snapshot
    pub fn state(&self) -> QueryState<Vec<ChatSession>> {
        self.sub.state()
    }

    /// Await the next state change; false once the feed has stopped
    pub async fn changed(&mut self) -> bool {
        self.sub.changed().await
    }

    /// Stop polling; an in-flight response is ignored on arrival
    pub fn stop(&self) {
        self.sub.stop()
    }
}
