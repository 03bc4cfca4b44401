//! Keyed query cache
//!
//! Stores the last fetched payload per `(resource kind, session)` key and
//! drives the polling subscriptions the sync feeds are built on. The cache
//! owns the key discipline the rest of the crate relies on:
//!
//! - at most one in-flight fetch per key
//! - invalidation marks a key stale and wakes its subscribers for an eager
//!   re-fetch; re-invalidating a stale key is a no-op
//! - a fetch result raced by an invalidation is discarded, never applied
//! - cancellation is an explicit token; nothing is written after teardown

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::error::ClientResult;

mod key;
mod store;
mod subscription;

pub use key::{QueryKey, ResourceKind};
pub use subscription::{QueryState, Subscription};

use store::KeyState;

/// Shared keyed cache. Cheap to clone; all clones see the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: DashMap<QueryKey, Arc<KeyState>>,
    /// Parent of every subscription's cancellation token
    root: CancellationToken,
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                root: CancellationToken::new(),
            }),
        }
    }

    fn entry(&self, key: QueryKey) -> Arc<KeyState> {
        self.inner
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(KeyState::new()))
            .clone()
    }

    /// Subscribe to a key: initial fetch immediately, then re-fetch every
    /// `interval` and on invalidation, until the handle is stopped/dropped.
    pub fn subscribe<T, F, Fut>(
        &self,
        key: QueryKey,
        interval: Duration,
        fetch: F,
    ) -> Subscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let cancel = self.inner.root.child_token();
        let state = self.entry(key);
        let rx = subscription::spawn_poll_loop(key, state, interval, fetch, cancel.clone());
        Subscription::active(key, rx, cancel)
    }

    /// Disabled subscription for an absent identifier: yields an empty,
    /// non-loading, non-error state and issues no requests.
    pub fn idle<T: Clone>(&self, key: QueryKey) -> Subscription<T> {
        Subscription::idle(key, self.inner.root.child_token())
    }

    /// Mark one key stale and wake its subscribers.
    pub fn invalidate(&self, key: QueryKey) {
        if let Some(state) = self.inner.entries.get(&key) {
            Self::apply_invalidation(&key, &state);
        }
    }

    /// Mark every key of one resource kind stale (key-prefix invalidation).
    pub fn invalidate_kind(&self, kind: ResourceKind) {
        for entry in self.inner.entries.iter() {
            if entry.key().kind == kind {
                Self::apply_invalidation(entry.key(), entry.value());
            }
        }
    }

    fn apply_invalidation(key: &QueryKey, state: &KeyState) {
        match state.invalidate() {
            store::Invalidation::Staled => {
                tracing::debug!(key = %key, "cache key invalidated");
                state.invalidated.notify_waiters();
            }
            store::Invalidation::RacedInFlight => {
                tracing::debug!(key = %key, "cache key invalidated during fetch");
            }
            store::Invalidation::NoOp => {}
        }
    }

    /// Stop every subscription spawned from this cache.
    pub fn shutdown(&self) {
        self.inner.root.cancel();
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}
