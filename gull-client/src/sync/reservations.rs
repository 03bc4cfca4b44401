//! Reservation feed

use std::sync::Arc;
use std::time::Duration;

use crate::api::ChatApi;
use crate::cache::{QueryCache, QueryKey, QueryState, ResourceKind, Subscription};
use shared::models::{Reservation, SessionId};

/// Polling view of the reservations linked to one session.
///
/// Lenient by contract: reservations are auxiliary context for the chat
/// view, so any fetch failure (transport, HTTP status, decode) is logged
/// and served as an empty list. The consumer never sees an error here;
/// the asymmetry with [`super::MessageFeed`] is intentional.
pub struct ReservationFeed {
    sub: Subscription<Vec<Reservation>>,
}

impl ReservationFeed {
    pub(crate) fn new(
        api: Arc<dyn ChatApi>,
        cache: &QueryCache,
        session_id: Option<SessionId>,
        interval: Duration,
    ) -> Self {
        let sub = match session_id {
            Some(id) => cache.subscribe(QueryKey::reservations(id), interval, move || {
                let api = api.clone();
                async move {
                    match api.fetch_reservations(id).await {
                        Ok(reservations) => Ok(reservations),
                        Err(error) => {
                            tracing::warn!(
                                session_id = id,
                                error = %error,
                                "reservation fetch failed, serving empty list"
                            );
                            Ok(Vec::new())
                        }
                    }
                }
            }),
            None => cache.idle(QueryKey {
                kind: ResourceKind::Reservations,
                session: None,
            }),
        };
        Self { sub }
    }

    /// Linked reservations; empty while idle, unavailable, or none exist
    pub fn reservations(&self) -> Vec<Reservation> {
        self.sub.state().data.unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.sub.state().is_loading
    }

    /// Full state snapshot; `error` is always `None` by policy
    pub fn state(&self) -> QueryState<Vec<Reservation>> {
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
