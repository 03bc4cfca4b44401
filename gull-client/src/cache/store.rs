//! Per-key cache state
//!
//! Each key carries the last successfully fetched payload plus the metadata
//! the sync loop needs: a fetch generation (bumped on invalidate, used to
//! discard responses that raced an invalidation), a staleness flag, and an
//! async mutex serializing fetches so at most one request per key is in
//! flight at a time.

use std::any::Any;
use std::sync::Mutex;

use tokio::sync::Notify;
use tokio::time::Instant;

/// Metadata and payload guarded together, so an invalidation and a fetch
/// completion can never interleave halfway.
struct KeyMeta {
    /// Bumped on every effective invalidation
    generation: u64,
    /// Set by invalidate, cleared by a successfully applied fetch
    stale: bool,
    payload: Option<CachedPayload>,
}

struct CachedPayload {
    value: Box<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

/// Outcome of [`KeyState::invalidate`]
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Invalidation {
    /// Fresh entry marked stale; subscribers should be woken
    Staled,
    /// Already stale with a fetch in flight; that result will be discarded
    RacedInFlight,
    /// Already stale and waiting; nothing to do
    NoOp,
}

/// Shared state for one cache key
pub(crate) struct KeyState {
    meta: Mutex<KeyMeta>,
    /// Serializes fetches for this key: at most one in flight
    pub(crate) fetch_lock: tokio::sync::Mutex<()>,
    /// Wakes subscribers for an eager re-fetch after an invalidation
    pub(crate) invalidated: Notify,
}

impl KeyState {
    pub(crate) fn new() -> Self {
        Self {
            meta: Mutex::new(KeyMeta {
                generation: 0,
                stale: false,
                payload: None,
            }),
            fetch_lock: tokio::sync::Mutex::new(()),
            invalidated: Notify::new(),
        }
    }

    /// Mark the entry stale.
    ///
    /// Three cases, and the distinction matters:
    /// - fresh entry: stale it, bump the generation, caller wakes
    ///   subscribers for an eager re-fetch;
    /// - stale entry with a fetch in flight: that fetch was issued before
    ///   this invalidation and would serve pre-mutation data; bump the
    ///   generation so its result is discarded and re-fetched. No wake
    ///   needed, the fetching subscriber loops on the mismatch itself;
    /// - stale entry just waiting for its wake-up: no-op. The pending
    ///   fetch has not been issued yet, so it will satisfy this
    ///   invalidation too; bumping would only cause a duplicate call.
    pub(crate) fn invalidate(&self) -> Invalidation {
        let mut meta = self.meta.lock().unwrap();
        if !meta.stale {
            meta.stale = true;
            meta.generation += 1;
            return Invalidation::Staled;
        }
        if self.fetch_lock.try_lock().is_err() {
            meta.generation += 1;
            return Invalidation::RacedInFlight;
        }
        Invalidation::NoOp
    }

    pub(crate) fn is_stale(&self) -> bool {
        self.meta.lock().unwrap().stale
    }

    /// Generation to tag an outgoing fetch with
    pub(crate) fn begin_fetch(&self) -> u64 {
        self.meta.lock().unwrap().generation
    }

    /// Whether a fetch started under `generation` is still the newest one
    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.meta.lock().unwrap().generation == generation
    }

    /// Apply a fetch result. The new value fully replaces the old one (no
    /// merge). Returns false when a newer generation was issued while the
    /// fetch was in flight; the caller discards the value and fetches again.
    pub(crate) fn apply<T: Clone + Send + Sync + 'static>(&self, generation: u64, value: T) -> bool {
        let mut meta = self.meta.lock().unwrap();
        if meta.generation != generation {
            return false;
        }
        meta.payload = Some(CachedPayload {
            value: Box::new(value),
            fetched_at: Instant::now(),
        });
        meta.stale = false;
        true
    }

    /// Last applied payload, if it is of the requested type
    pub(crate) fn cached<T: Clone + Send + Sync + 'static>(&self) -> Option<(T, Instant)> {
        let meta = self.meta.lock().unwrap();
        let payload = meta.payload.as_ref()?;
        payload
            .value
            .downcast_ref::<T>()
            .cloned()
            .map(|v| (v, payload.fetched_at))
    }
}
