// gull-client/tests/chat_sync.rs
// Integration tests for the chat synchronization core, driven through a
// mock backend and the paused tokio clock.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gull_client::{
    ActionError, ActionNotices, AuthorRole, ChatApi, ChatContext, ChatMessage, ChatSession,
    ClientConfig, ClientError, ClientResult, QueryKey, Reservation, ResourceKind, SessionId,
    SessionStatus,
};

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Debug, Clone)]
struct MockApi {
    inner: Arc<MockState>,
}

#[derive(Debug, Default)]
struct MockState {
    log: Mutex<Vec<ChatMessage>>,
    reservations: Mutex<Vec<Reservation>>,
    sessions: Mutex<Vec<ChatSession>>,
    /// Applied to every fetch, after the response snapshot is taken
    fetch_delay: Mutex<Option<Duration>>,
    /// Applied to send/close
    mutation_delay: Mutex<Option<Duration>>,
    fail_messages: AtomicBool,
    fail_reservations: AtomicBool,
    fail_send: AtomicBool,
    fail_close: AtomicBool,
    message_calls: AtomicUsize,
    reservation_calls: AtomicUsize,
    session_calls: AtomicUsize,
    send_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl MockApi {
    fn new() -> Self {
        Self {
            inner: Arc::new(MockState::default()),
        }
    }

    fn push_message(&self, message: ChatMessage) {
        self.inner.log.lock().unwrap().push(message);
    }

    fn set_fetch_delay(&self, delay: Option<Duration>) {
        *self.inner.fetch_delay.lock().unwrap() = delay;
    }

    fn set_mutation_delay(&self, delay: Option<Duration>) {
        *self.inner.mutation_delay.lock().unwrap() = delay;
    }

    fn fail_messages(&self, fail: bool) {
        self.inner.fail_messages.store(fail, Ordering::SeqCst);
    }

    fn fail_reservations(&self, fail: bool) {
        self.inner.fail_reservations.store(fail, Ordering::SeqCst);
    }

    fn fail_send(&self, fail: bool) {
        self.inner.fail_send.store(fail, Ordering::SeqCst);
    }

    fn fail_close(&self, fail: bool) {
        self.inner.fail_close.store(fail, Ordering::SeqCst);
    }

    fn message_calls(&self) -> usize {
        self.inner.message_calls.load(Ordering::SeqCst)
    }

    fn reservation_calls(&self) -> usize {
        self.inner.reservation_calls.load(Ordering::SeqCst)
    }

    fn session_calls(&self) -> usize {
        self.inner.session_calls.load(Ordering::SeqCst)
    }

    fn send_calls(&self) -> usize {
        self.inner.send_calls.load(Ordering::SeqCst)
    }

    fn close_calls(&self) -> usize {
        self.inner.close_calls.load(Ordering::SeqCst)
    }

    async fn apply_fetch_delay(&self) {
        let delay = *self.inner.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn apply_mutation_delay(&self) {
        let delay = *self.inner.mutation_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ChatApi for MockApi {
    async fn fetch_messages(&self, session_id: SessionId) -> ClientResult<Vec<ChatMessage>> {
        self.inner.message_calls.fetch_add(1, Ordering::SeqCst);
        // snapshot at issuance, the way a server builds its response
        let snapshot: Vec<ChatMessage> = self
            .inner
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        self.apply_fetch_delay().await;
        if self.inner.fail_messages.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("mock backend outage".to_string()));
        }
        Ok(snapshot)
    }

    async fn send_message(
        &self,
        session_id: SessionId,
        content: &str,
    ) -> ClientResult<serde_json::Value> {
        self.inner.send_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_mutation_delay().await;
        if self.inner.fail_send.load(Ordering::SeqCst) {
            return Err(ClientError::Validation("mock send rejected".to_string()));
        }
        let mut log = self.inner.log.lock().unwrap();
        let id = 1000 + log.len() as i64;
        log.push(ChatMessage {
            id,
            session_id,
            author: AuthorRole::Staff,
            content: content.to_string(),
            sent_at: 1_700_000_000_000,
        });
        Ok(serde_json::json!({ "message_id": id }))
    }

    async fn close_session(&self, session_id: SessionId) -> ClientResult<serde_json::Value> {
        self.inner.close_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_mutation_delay().await;
        if self.inner.fail_close.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("mock close failed".to_string()));
        }
        let mut sessions = self.inner.sessions.lock().unwrap();
        if let Some(session) = sessions.iter_mut().find(|s| s.id == session_id) {
            session.status = SessionStatus::Closed;
        }
        Ok(serde_json::json!({ "closed": true }))
    }

    async fn fetch_reservations(&self, session_id: SessionId) -> ClientResult<Vec<Reservation>> {
        self.inner.reservation_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot: Vec<Reservation> = self
            .inner
            .reservations
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        self.apply_fetch_delay().await;
        if self.inner.fail_reservations.load(Ordering::SeqCst) {
            return Err(ClientError::Internal("mock backend outage".to_string()));
        }
        Ok(snapshot)
    }

    async fn fetch_sessions(&self) -> ClientResult<Vec<ChatSession>> {
        self.inner.session_calls.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.inner.sessions.lock().unwrap().clone();
        self.apply_fetch_delay().await;
        Ok(snapshot)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn message(id: i64, session_id: SessionId, content: &str) -> ChatMessage {
    ChatMessage {
        id,
        session_id,
        author: AuthorRole::Customer,
        content: content.to_string(),
        sent_at: 1_700_000_000_000 + id,
    }
}

fn session(id: SessionId) -> ChatSession {
    ChatSession {
        id,
        restaurant_id: 7,
        status: SessionStatus::Open,
        created_at: 1_700_000_000_000,
        last_message_at: None,
    }
}

/// Config with effectively-disabled periodic polling, for tests that only
/// exercise the initial fetch and eager invalidation paths.
fn slow_poll_config() -> ClientConfig {
    ClientConfig::default()
        .with_message_poll(Duration::from_secs(3600))
        .with_reservation_poll(Duration::from_secs(3600))
        .with_session_list_poll(Duration::from_secs(3600))
}

/// Step the paused clock until `cond` holds.
async fn wait_for(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(600), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

// ============================================================================
// Idle state
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_absent_session_issues_no_requests() {
    let api = MockApi::new();
    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());

    let messages = ctx.messages(None);
    let reservations = ctx.reservations(None);

    tokio::time::sleep(Duration::from_secs(60)).await;

    assert_eq!(api.message_calls(), 0);
    assert_eq!(api.reservation_calls(), 0);
    assert!(messages.messages().is_empty());
    assert!(reservations.reservations().is_empty());
    assert!(!messages.is_loading());
    assert!(!reservations.is_loading());
    assert!(messages.error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_invalidating_unsubscribed_key_is_noop() {
    let api = MockApi::new();
    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());

    ctx.cache().invalidate(QueryKey::messages(999));
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(api.message_calls(), 0);
}

// ============================================================================
// Message feed
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_message_feed_polls_and_replaces() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));

    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());
    let feed = ctx.messages(Some(42));

    wait_for(|| !feed.messages().is_empty()).await;
    assert_eq!(feed.messages().len(), 1);
    assert_eq!(api.message_calls(), 1);

    // server log grows; the next 5s tick replaces the whole list
    api.push_message(message(2, 42, "anyone there?"));
    wait_for(|| feed.messages().len() == 2).await;

    let ids: Vec<i64> = feed.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(api.message_calls() >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_message_feed_scoped_to_its_session() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "mine"));
    api.push_message(message(2, 43, "someone else's"));

    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());
    let feed = ctx.messages(Some(42));

    wait_for(|| !feed.messages().is_empty()).await;
    assert_eq!(feed.messages().len(), 1);
    assert_eq!(feed.messages()[0].content, "mine");
}

#[tokio::test(start_paused = true)]
async fn test_message_fetch_errors_are_observable() {
    let api = MockApi::new();
    api.fail_messages(true);

    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());
    let feed = ctx.messages(Some(42));

    wait_for(|| feed.error().is_some()).await;
    assert!(feed.messages().is_empty());
    assert!(!feed.is_loading());

    // recovery on a later tick clears the error
    api.fail_messages(false);
    api.push_message(message(1, 42, "back"));
    wait_for(|| !feed.messages().is_empty()).await;
    assert!(feed.error().is_none());
}

// ============================================================================
// Reservation feed (lenient policy)
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reservation_failures_degrade_to_empty() {
    let api = MockApi::new();
    api.fail_reservations(true);
    api.set_fetch_delay(Some(Duration::from_millis(100)));

    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());
    let feed = ctx.reservations(Some(42));

    // loading is observable while the (failing) fetch is outstanding
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(feed.is_loading());

    wait_for(|| feed.state().data.is_some()).await;
    let state = feed.state();
    assert_eq!(state.data.unwrap(), Vec::<Reservation>::new());
    assert!(!state.is_loading);
    assert!(state.error.is_none(), "lenient feed must not expose errors");
    assert!(api.reservation_calls() >= 1);
}

// ============================================================================
// Mutations and cross-resource invalidation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_send_invalidates_messages_and_reservations() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "table for two"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let messages = ctx.messages(Some(42));
    let reservations = ctx.reservations(Some(42));
    let sessions = ctx.sessions();

    wait_for(|| {
        messages.state().data.is_some()
            && reservations.state().data.is_some()
            && sessions.state().data.is_some()
    })
    .await;
    assert_eq!(api.message_calls(), 1);
    assert_eq!(api.reservation_calls(), 1);
    assert_eq!(api.session_calls(), 1);

    let receipt = ctx.actions().send_message(42, "we accept").await.unwrap();
    assert!(receipt.get("message_id").is_some());

    // both session-scoped keys re-fetch eagerly; the directory does not
    wait_for(|| api.message_calls() == 2 && api.reservation_calls() == 2).await;
    assert_eq!(api.session_calls(), 1);
    assert_eq!(api.send_calls(), 1);
    assert_eq!(api.close_calls(), 0);

    // the sent message became visible through the re-fetch, not optimistically
    wait_for(|| messages.messages().len() == 2).await;
    assert_eq!(messages.messages()[1].content, "we accept");

    // exactly once: no further traffic until the next natural tick
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.message_calls(), 2);
    assert_eq!(api.reservation_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_close_invalidates_directory_only() {
    let api = MockApi::new();
    {
        let mut sessions = api.inner.sessions.lock().unwrap();
        sessions.push(session(42));
    }
    api.push_message(message(1, 42, "bye"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let messages = ctx.messages(Some(42));
    let sessions = ctx.sessions();
    wait_for(|| messages.state().data.is_some() && sessions.state().data.is_some()).await;

    ctx.actions().close_session(42).await.unwrap();

    wait_for(|| api.session_calls() == 2).await;
    assert_eq!(sessions.sessions()[0].status, SessionStatus::Closed);
    // the message log key was not touched
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.message_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_send_touches_no_cache_key() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    api.fail_send(true);
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let messages = ctx.messages(Some(42));
    wait_for(|| messages.state().data.is_some()).await;

    let error = ctx.actions().send_message(42, "lost").await.unwrap_err();
    assert!(matches!(error, ActionError::Send { .. }));
    assert_eq!(error.notice(), ActionNotices::default().send_failed);
    assert!(matches!(error.cause(), ClientError::Validation(_)));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.message_calls(), 1, "no invalidation on failure");
    assert_eq!(api.reservation_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_failed_close_keeps_directory_key() {
    let api = MockApi::new();
    api.fail_close(true);
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let sessions = ctx.sessions();
    wait_for(|| sessions.state().data.is_some()).await;

    let error = ctx.actions().close_session(42).await.unwrap_err();
    assert!(matches!(error, ActionError::Close { .. }));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.session_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_custom_notice_text() {
    let api = MockApi::new();
    api.fail_send(true);
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config()).with_notices(
        ActionNotices {
            send_failed: "Nachricht konnte nicht gesendet werden".to_string(),
            ..ActionNotices::default()
        },
    );

    let error = ctx.actions().send_message(42, "hi").await.unwrap_err();
    assert_eq!(error.notice(), "Nachricht konnte nicht gesendet werden");
}

#[tokio::test(start_paused = true)]
async fn test_pending_flag_during_send() {
    let api = MockApi::new();
    api.set_mutation_delay(Some(Duration::from_millis(500)));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let actions = ctx.actions();
    let in_flight = actions.clone();
    let handle = tokio::spawn(async move { in_flight.send_message(42, "hi").await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(actions.send_pending());
    assert!(!actions.close_pending());

    handle.await.unwrap().unwrap();
    assert!(!actions.send_pending());
}

// ============================================================================
// Invalidation discipline
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_repeat_invalidation_coalesces() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let messages = ctx.messages(Some(42));
    wait_for(|| messages.state().data.is_some()).await;
    assert_eq!(api.message_calls(), 1);

    // two invalidations before the subscriber can react: one re-fetch
    ctx.cache().invalidate(QueryKey::messages(42));
    ctx.cache().invalidate(QueryKey::messages(42));

    wait_for(|| api.message_calls() == 2).await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.message_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_kind_invalidation_hits_every_session_key() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "here"));
    api.push_message(message(2, 43, "there"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let first = ctx.messages(Some(42));
    let second = ctx.messages(Some(43));
    wait_for(|| first.state().data.is_some() && second.state().data.is_some()).await;
    assert_eq!(api.message_calls(), 2);

    ctx.cache().invalidate_kind(ResourceKind::Messages);

    wait_for(|| api.message_calls() == 4).await;
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(api.message_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_stale_in_flight_response_is_discarded() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let messages = ctx.messages(Some(42));
    wait_for(|| messages.state().data.is_some()).await;
    assert_eq!(api.message_calls(), 1);

    // re-fetch #2 snapshots the old log, then hangs
    api.set_fetch_delay(Some(Duration::from_secs(1)));
    ctx.cache().invalidate(QueryKey::messages(42));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(api.message_calls(), 2);

    // the log changes while #2 is in flight; invalidating again makes the
    // in-flight snapshot stale
    api.push_message(message(2, 42, "latest"));
    ctx.cache().invalidate(QueryKey::messages(42));

    // #2's single-message snapshot must never land; #3 brings the new log
    wait_for(|| messages.messages().len() == 2).await;
    assert_eq!(api.message_calls(), 3);
    let ids: Vec<i64> = messages.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_stopped_feed_ignores_in_flight_response() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    api.set_fetch_delay(Some(Duration::from_secs(1)));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());

    let feed = ctx.messages(Some(42));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(feed.is_loading());
    assert_eq!(api.message_calls(), 1);

    // session goes away mid-poll; the pending response must not land
    feed.stop();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(feed.messages().is_empty());
    assert_eq!(api.message_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_switching_to_absent_session_stops_polling() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());

    let feed = ctx.messages(Some(42));
    wait_for(|| !feed.messages().is_empty()).await;
    let calls_before = api.message_calls();

    // identifier becomes absent: drop the old feed, take the idle one
    drop(feed);
    let feed = ctx.messages(None);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(api.message_calls(), calls_before);
    assert!(feed.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_context_shutdown_stops_all_feeds() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), ClientConfig::default());

    let messages = ctx.messages(Some(42));
    let reservations = ctx.reservations(Some(42));
    wait_for(|| messages.state().data.is_some() && reservations.state().data.is_some()).await;

    ctx.shutdown();
    let messages_before = api.message_calls();
    let reservations_before = api.reservation_calls();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(api.message_calls(), messages_before);
    assert_eq!(api.reservation_calls(), reservations_before);
}

// ============================================================================
// Shared-key behavior
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_second_subscriber_starts_from_cache() {
    let api = MockApi::new();
    api.push_message(message(1, 42, "hello"));
    let ctx = ChatContext::with_api(Arc::new(api.clone()), slow_poll_config());

    let first = ctx.messages(Some(42));
    wait_for(|| first.state().data.is_some()).await;
    assert_eq!(api.message_calls(), 1);

    // a second view of the same session sees the cached log immediately
    let second = ctx.messages(Some(42));
    wait_for(|| second.state().data.is_some()).await;
    assert_eq!(second.messages().len(), 1);
}
