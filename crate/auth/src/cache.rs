//! Optional time-bounded cache in front of a [`KeySetSource`].
//!
//! With a zero TTL the cache is bypassed and every verification fetches the key set again.
//!
//! Concurrent callers missing the cache join a single in-flight fetch and all get its
//! outcome, success or failure. A failed fetch is not cached: the next caller to arrive
//! after it completed starts a new one.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};

use crate::{
    events::{AuthEvent, SharedEvents},
    jwks::SigningKeySet,
    key_source::KeySetSource,
    result::AuthResult,
};

struct CachedKeySet {
    key_set: Arc<SigningKeySet>,
    fetched_at: Instant,
}

type SharedFetch = Shared<BoxFuture<'static, AuthResult<Arc<SigningKeySet>>>>;

struct InFlight {
    generation: u64,
    fetch: SharedFetch,
}

enum Joined {
    Cached(Arc<SigningKeySet>),
    InFlight { generation: u64, fetch: SharedFetch },
}

#[derive(Default)]
struct Refresh {
    next_generation: u64,
    in_flight: Option<InFlight>,
}

pub struct CachedKeySetSource {
    inner: Arc<dyn KeySetSource>,
    ttl: Duration,
    entry: RwLock<Option<CachedKeySet>>,
    refresh: Mutex<Refresh>,
    events: SharedEvents,
}

impl CachedKeySetSource {
    #[must_use]
    pub fn new(inner: Arc<dyn KeySetSource>, ttl: Duration, events: SharedEvents) -> Self {
        Self {
            inner,
            ttl,
            entry: RwLock::new(None),
            refresh: Mutex::new(Refresh::default()),
            events,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Forget the cached key set, forcing the next call to fetch.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    async fn fresh(&self) -> Option<Arc<SigningKeySet>> {
        let entry = self.entry.read().await;
        entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.key_set.clone())
    }

    async fn served_from_cache(&self) -> Option<Arc<SigningKeySet>> {
        let key_set = self.fresh().await?;
        self.events.record(AuthEvent::KeySetServedFromCache {
            keys: key_set.len(),
        });
        Some(key_set)
    }

    /// Join the fetch in flight, or start one.
    async fn join_fetch(&self) -> Joined {
        let mut refresh = self.refresh.lock().await;
        // another caller may have refreshed while we were waiting
        if let Some(key_set) = self.served_from_cache().await {
            return Joined::Cached(key_set);
        }
        if let Some(in_flight) = &refresh.in_flight {
            return Joined::InFlight {
                generation: in_flight.generation,
                fetch: in_flight.fetch.clone(),
            };
        }
        let inner = self.inner.clone();
        let fetch = async move { inner.fetch_key_set().await }.boxed().shared();
        let generation = refresh.next_generation;
        refresh.next_generation += 1;
        refresh.in_flight = Some(InFlight {
            generation,
            fetch: fetch.clone(),
        });
        Joined::InFlight { generation, fetch }
    }

    /// Store the outcome of fetch `generation`, unless another caller already did.
    async fn complete(&self, generation: u64, outcome: &AuthResult<Arc<SigningKeySet>>) {
        let mut refresh = self.refresh.lock().await;
        if refresh
            .in_flight
            .as_ref()
            .is_none_or(|in_flight| in_flight.generation != generation)
        {
            return;
        }
        if let Ok(key_set) = outcome {
            *self.entry.write().await = Some(CachedKeySet {
                key_set: key_set.clone(),
                fetched_at: Instant::now(),
            });
        }
        refresh.in_flight = None;
    }
}

#[async_trait]
impl KeySetSource for CachedKeySetSource {
    async fn fetch_key_set(&self) -> AuthResult<Arc<SigningKeySet>> {
        if self.ttl.is_zero() {
            return self.inner.fetch_key_set().await;
        }
        if let Some(key_set) = self.served_from_cache().await {
            return Ok(key_set);
        }

        let (generation, fetch) = match self.join_fetch().await {
            Joined::Cached(key_set) => return Ok(key_set),
            Joined::InFlight { generation, fetch } => (generation, fetch),
        };
        let outcome = fetch.await;
        self.complete(generation, &outcome).await;
        outcome
    }
}

/// Put `source` behind a cache, unless `ttl` is zero.
#[must_use]
pub fn with_optional_cache(
    source: Arc<dyn KeySetSource>,
    ttl: Duration,
    events: SharedEvents,
) -> Arc<dyn KeySetSource> {
    if ttl.is_zero() {
        source
    } else {
        Arc::new(CachedKeySetSource::new(source, ttl, events))
    }
}
