//! Polling subscriptions
//!
//! A subscription owns one background task that re-fetches its key on a
//! fixed interval, wakes early when the key is invalidated, and publishes
//! every observed state through a watch channel. Dropping (or stopping) the
//! subscription cancels the task deterministically; a response that arrives
//! after cancellation is never applied.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::key::QueryKey;
use super::store::KeyState;
use crate::error::{ClientError, ClientResult};

/// Continuously-updated view of one cached query
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    /// Last successfully fetched value; `None` until the first fetch lands
    pub data: Option<T>,
    /// A fetch for this key is currently outstanding
    pub is_loading: bool,
    /// Error from the most recent failed fetch; cleared by the next success
    pub error: Option<Arc<ClientError>>,
}

impl<T> QueryState<T> {
    pub(crate) fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Handle to one polling subscription.
///
/// The subscription stays live for as long as the handle exists; dropping it
/// stops the poll task and makes any in-flight response land nowhere.
pub struct Subscription<T> {
    key: QueryKey,
    rx: watch::Receiver<QueryState<T>>,
    cancel: CancellationToken,
    /// Keeps a disabled subscription's channel open so `changed()` pends
    /// instead of reporting a closed sender.
    _idle_tx: Option<watch::Sender<QueryState<T>>>,
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn active(
        key: QueryKey,
        rx: watch::Receiver<QueryState<T>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            key,
            rx,
            cancel,
            _idle_tx: None,
        }
    }

    /// Disabled subscription: empty state, no task, no requests.
    pub(crate) fn idle(key: QueryKey, cancel: CancellationToken) -> Self {
        let (tx, rx) = watch::channel(QueryState::idle());
        Self {
            key,
            rx,
            cancel,
            _idle_tx: Some(tx),
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    /// Current state snapshot
    pub fn state(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    /// Await the next published state change.
    ///
    /// Returns false once the subscription has stopped and no further
    /// updates will ever arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Stop polling. In-flight responses are ignored on arrival.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn the poll task for one key and return its state channel.
pub(crate) fn spawn_poll_loop<T, F, Fut>(
    key: QueryKey,
    state: Arc<KeyState>,
    interval: Duration,
    fetch: F,
    cancel: CancellationToken,
) -> watch::Receiver<QueryState<T>>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ClientResult<T>> + Send + 'static,
{
    let (tx, rx) = watch::channel(QueryState::idle());

    tokio::spawn(async move {
        // A later subscriber to an already-polled key starts from the
        // cached value instead of a blank screen.
        if let Some((value, _)) = state.cached::<T>() {
            tx.send_replace(QueryState {
                data: Some(value),
                is_loading: false,
                error: None,
            });
        }

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                _ = state.invalidated.notified() => {}
            }

            if !fetch_cycle(key, &state, &fetch, &tx, &cancel).await {
                break;
            }
        }

        tracing::debug!(key = %key, "cache subscription stopped");
    });

    rx
}

/// One wake-up of the poll loop: fetch, then publish.
///
/// Returns false when the subscription was cancelled and the task must end.
/// Loops internally while responses keep getting raced by invalidations
/// (last-request-wins: a result is only applied if no newer generation was
/// issued while it was in flight).
async fn fetch_cycle<T, F, Fut>(
    key: QueryKey,
    state: &KeyState,
    fetch: &F,
    tx: &watch::Sender<QueryState<T>>,
    cancel: &CancellationToken,
) -> bool
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = ClientResult<T>> + Send,
{
    let woke_at = Instant::now();

    loop {
        let _in_flight = tokio::select! {
            _ = cancel.cancelled() => return false,
            guard = state.fetch_lock.lock() => guard,
        };

        // Another subscriber of this key may have completed a fetch while
        // we waited for the lock; mirror it instead of fetching twice.
        if !state.is_stale() {
            if let Some((value, fetched_at)) = state.cached::<T>() {
                if fetched_at >= woke_at {
                    tx.send_replace(QueryState {
                        data: Some(value),
                        is_loading: false,
                        error: None,
                    });
                    return true;
                }
            }
        }

        let generation = state.begin_fetch();
        tx.send_modify(|s| s.is_loading = true);

        let result = tokio::select! {
            _ = cancel.cancelled() => return false,
            result = fetch() => result,
        };

        match result {
            Ok(value) => {
                if state.apply(generation, value.clone()) {
                    tx.send_replace(QueryState {
                        data: Some(value),
                        is_loading: false,
                        error: None,
                    });
                    return true;
                }
                // Invalidated while in flight; the response is stale.
                tracing::debug!(key = %key, "discarding response raced by invalidation");
            }
            Err(error) => {
                if state.is_current(generation) {
                    tracing::debug!(key = %key, error = %error, "query fetch failed");
                    let error = Arc::new(error);
                    tx.send_modify(move |s| {
                        s.is_loading = false;
                        s.error = Some(error);
                    });
                    return true;
                }
                // Newer generation wants fresh data anyway; retry silently.
            }
        }
    }
}
