//! Composition root
//!
//! One `ChatContext` per authenticated backend connection. It owns the API
//! client and the query cache and hands out feeds and actions wired to
//! them; nothing in this crate reaches for ambient state. Lifecycle belongs
//! to whoever constructs the context: drop a feed to stop its polling,
//! call [`ChatContext::shutdown`] to stop everything.

use std::sync::Arc;
use std::time::Duration;

use crate::actions::{ActionNotices, ChatActions};
use crate::api::ChatApi;
use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::sync::{MessageFeed, ReservationFeed, SessionListFeed};
use shared::models::SessionId;

/// Explicit context object tying the API client, the cache, and the
/// configured poll intervals together.
#[derive(Debug, Clone)]
pub struct ChatContext {
    api: Arc<dyn ChatApi>,
    cache: QueryCache,
    config: ClientConfig,
    notices: ActionNotices,
}

impl ChatContext {
    /// Context over the standard HTTP backend
    pub fn new(config: ClientConfig) -> Self {
        let api: Arc<dyn ChatApi> = Arc::new(config.build_http_client());
        Self::with_api(api, config)
    }

    /// Context over any [`ChatApi`] implementation (tests, local stubs)
    pub fn with_api(api: Arc<dyn ChatApi>, config: ClientConfig) -> Self {
        Self {
            api,
            cache: QueryCache::new(),
            config,
            notices: ActionNotices::default(),
        }
    }

    /// Override the user-facing failure notices
    pub fn with_notices(mut self, notices: ActionNotices) -> Self {
        self.notices = notices;
        self
    }

    /// Message feed for a session at the configured interval.
    ///
    /// `None` yields the idle feed: empty list, no requests. Switching
    /// sessions means dropping this feed and asking for a new one; the old
    /// subscription cancels deterministically on drop.
    pub fn messages(&self, session_id: Option<SessionId>) -> MessageFeed {
        self.messages_every(session_id, self.config.message_poll)
    }

    /// Message feed with an explicit refresh interval
    pub fn messages_every(&self, session_id: Option<SessionId>, interval: Duration) -> MessageFeed {
        MessageFeed::new(self.api.clone(), &self.cache, session_id, interval)
    }

    /// Reservation feed for a session at the configured interval
    pub fn reservations(&self, session_id: Option<SessionId>) -> ReservationFeed {
        self.reservations_every(session_id, self.config.reservation_poll)
    }

    /// Reservation feed with an explicit refresh interval
    pub fn reservations_every(
        &self,
        session_id: Option<SessionId>,
        interval: Duration,
    ) -> ReservationFeed {
        ReservationFeed::new(self.api.clone(), &self.cache, session_id, interval)
    }

    /// Session directory feed at the configured interval
    pub fn sessions(&self) -> SessionListFeed {
        SessionListFeed::new(self.api.clone(), &self.cache, self.config.session_list_poll)
    }

    /// Mutation coordinator bound to this context's cache
    pub fn actions(&self) -> ChatActions {
        ChatActions::new(self.api.clone(), self.cache.clone(), self.notices.clone())
    }

    /// The underlying cache (for embedders that invalidate on their own cues)
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Stop every subscription created from this context
    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}
