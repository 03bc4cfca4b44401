//! Message log feed

use std::sync::Arc;
use std::time::Duration;

use crate::api::ChatApi;
use crate::cache::{QueryCache, QueryKey, QueryState, Subscription};
use crate::error::ClientError;
use shared::models::{ChatMessage, SessionId};

/// Polling view of one session's message log.
///
/// The server owns the log: every refresh replaces the whole list, so
/// repeated polls can neither reorder nor duplicate rendered messages.
/// Fetch errors stay visible on [`MessageFeed::error`]: this feed is the
/// primary surface and must not hide trouble.
///
/// An absent session id is the idle state: no requests, empty list.
pub struct MessageFeed {
    sub: Subscription<Vec<ChatMessage>>,
}

impl MessageFeed {
    pub(crate) fn new(
        api: Arc<dyn ChatApi>,
        cache: &QueryCache,
        session_id: Option<SessionId>,
        interval: Duration,
    ) -> Self {
        let sub = match session_id {
            Some(id) => cache.subscribe(QueryKey::messages(id), interval, move || {
                let api = api.clone();
                async move { api.fetch_messages(id).await }
            }),
            None => cache.idle(QueryKey {
                kind: crate::cache::ResourceKind::Messages,
                session: None,
            }),
        };
        Self { sub }
    }

    /// Messages in server log order; empty until the first fetch lands
    pub fn messages(&self) -> Vec<ChatMessage> {
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
    pub fn state(&self) -> QueryState<Vec<ChatMessage>> {
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
