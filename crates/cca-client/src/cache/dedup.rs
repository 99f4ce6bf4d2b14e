//! # Request De-duplication Cache
//!
//! Holds one cached value with its fetch time and at most one in-flight
//! fetch. Concurrent callers that miss the cache join the in-flight fetch
//! instead of starting their own.
//!
//! The value is served only while younger than the TTL; expiry is lazy and
//! the stale value stays in place until overwritten or cleared. Failures are
//! never cached.
//!
//! The fetch registered by [`DedupCache::get_or_fetch`] runs on its own task,
//! so a caller that stops waiting does not cancel it: the result is still
//! stored for the next caller.

use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::clock::{Clock, SystemClock};

/// Outcome of a fetch as seen by every waiter
pub type FetchResult<T, E> = Result<Arc<T>, Arc<E>>;

/// Handle to an in-flight fetch. Any number of callers may await a clone.
pub type PendingFetch<T, E> = Shared<BoxFuture<'static, FetchResult<T, E>>>;

/// Identity of a fetch started by `get_or_fetch`
#[derive(Debug, Clone, Copy)]
struct Ticket {
    /// Pending slot this fetch owns
    id: u64,
    /// Entry generation the fetch started in
    generation: u64,
}

struct Pending<T, E> {
    id: u64,
    handle: PendingFetch<T, E>,
}

struct CacheEntry<T, E> {
    value: Option<Arc<T>>,
    fetched_at: Option<Instant>,
    pending: Option<Pending<T, E>>,
    /// Bumped by `clear()` only, so a fetch that outlived it cannot
    /// repopulate the entry.
    generation: u64,
    /// Source of pending slot ids
    next_id: u64,
}

impl<T, E> CacheEntry<T, E> {
    fn next_ticket(&mut self) -> Ticket {
        self.next_id += 1;
        Ticket {
            id: self.next_id,
            generation: self.generation,
        }
    }

    fn fresh(&self, now: Instant, ttl: Duration) -> Option<Arc<T>> {
        let fetched_at = self.fetched_at?;
        let value = self.value.as_ref()?;
        (now.saturating_duration_since(fetched_at) < ttl).then(|| Arc::clone(value))
    }
}

enum Lookup<T, E> {
    Hit(Arc<T>),
    Wait(PendingFetch<T, E>),
}

/// Single-key TTL cache with an in-flight fetch slot
pub struct DedupCache<T, E> {
    entry: Mutex<CacheEntry<T, E>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T, E> DedupCache<T, E> {
    fn lock(&self) -> MutexGuard<'_, CacheEntry<T, E>> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, E> Debug for DedupCache<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entry = self.lock();
        f.debug_struct("DedupCache")
            .field("ttl", &self.ttl)
            .field("has_value", &entry.value.is_some())
            .field("pending", &entry.pending.is_some())
            .field("generation", &entry.generation)
            .finish()
    }
}

impl<T, E> DedupCache<T, E>
where
    T: Send + Sync + 'static,
    E: Display + Send + Sync + 'static,
{
    /// Create a cache on the system clock
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache on an explicit clock
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entry: Mutex::new(CacheEntry {
                value: None,
                fetched_at: None,
                pending: None,
                generation: 0,
                next_id: 0,
            }),
            ttl,
            clock,
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value if present and younger than the TTL
    #[must_use]
    pub fn get(&self) -> Option<Arc<T>> {
        self.lock().fresh(self.clock.now(), self.ttl)
    }

    /// Store a value stamped with the current time
    pub fn set(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let mut entry = self.lock();
        entry.value = Some(Arc::clone(&value));
        entry.fetched_at = Some(self.clock.now());
        value
    }

    /// In-flight fetch, if one is registered
    #[must_use]
    pub fn get_pending(&self) -> Option<PendingFetch<T, E>> {
        self.lock().pending.as_ref().map(|p| p.handle.clone())
    }

    /// Register `handle` as the in-flight fetch, replacing any other.
    ///
    /// A fetch already started by `get_or_fetch` keeps running and still
    /// stores its result, but no longer owns the pending slot.
    pub fn set_pending(&self, handle: PendingFetch<T, E>) {
        let mut entry = self.lock();
        let id = entry.next_ticket().id;
        entry.pending = Some(Pending { id, handle });
        tracing::debug!(id, "Pending fetch set");
    }

    /// Drop the in-flight fetch so a new one may start
    pub fn clear_pending(&self) {
        self.lock().pending = None;
    }

    /// Forget the value, its timestamp and any in-flight fetch
    pub fn clear(&self) {
        let mut entry = self.lock();
        entry.value = None;
        entry.fetched_at = None;
        entry.pending = None;
        entry.generation += 1;
        tracing::debug!(generation = entry.generation, "Cache cleared");
    }

    /// Serve the cached value, join the in-flight fetch, or start one.
    ///
    /// The freshness check, the pending check and the registration of a new
    /// fetch happen under one lock, so concurrent callers start at most one
    /// fetch. `fetch` is invoked with the lock held and must not touch this
    /// cache.
    ///
    /// # Errors
    ///
    /// Returns the shared error of the fetch this call waited on.
    ///
    /// # Panics
    ///
    /// Panics when a fetch must be started outside a tokio runtime.
    pub async fn get_or_fetch<F, Fut>(self: &Arc<Self>, fetch: F) -> FetchResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: From<tokio::task::JoinError>,
    {
        let lookup = {
            let mut entry = self.lock();
            if let Some(value) = entry.fresh(self.clock.now(), self.ttl) {
                Lookup::Hit(value)
            } else if let Some(pending) = &entry.pending {
                tracing::debug!(id = pending.id, "Joining in-flight fetch");
                Lookup::Wait(pending.handle.clone())
            } else {
                let ticket = entry.next_ticket();
                let handle = self.spawn_fetch(ticket, fetch());
                entry.pending = Some(Pending {
                    id: ticket.id,
                    handle: handle.clone(),
                });
                tracing::debug!(id = ticket.id, generation = ticket.generation, "Started fetch");
                Lookup::Wait(handle)
            }
        };

        match lookup {
            Lookup::Hit(value) => {
                tracing::debug!("Cache hit");
                Ok(value)
            }
            Lookup::Wait(handle) => handle.await,
        }
    }

    fn spawn_fetch<Fut>(self: &Arc<Self>, ticket: Ticket, fut: Fut) -> PendingFetch<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: From<tokio::task::JoinError>,
    {
        let cache = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            let result = fut.await;
            settle(&cache, ticket, result)
        });

        let cache = Arc::downgrade(self);
        async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    tracing::error!(id = ticket.id, error = %join_error, "Fetch task aborted");
                    if let Some(cache) = cache.upgrade() {
                        cache.release(ticket.id);
                    }
                    Err(Arc::new(E::from(join_error)))
                }
            }
        }
        .boxed()
        .shared()
    }

    fn release(&self, id: u64) {
        let mut entry = self.lock();
        if entry.pending.as_ref().is_some_and(|p| p.id == id) {
            entry.pending = None;
        }
    }

    fn store(&self, ticket: Ticket, value: &Arc<T>) {
        let mut entry = self.lock();
        if entry.pending.as_ref().is_some_and(|p| p.id == ticket.id) {
            entry.pending = None;
        }
        if entry.generation == ticket.generation {
            entry.value = Some(Arc::clone(value));
            entry.fetched_at = Some(self.clock.now());
        } else {
            tracing::debug!(
                generation = ticket.generation,
                current = entry.generation,
                "Discarding result of invalidated fetch"
            );
        }
    }
}

fn settle<T, E>(cache: &Weak<DedupCache<T, E>>, ticket: Ticket, result: Result<T, E>) -> FetchResult<T, E>
where
    T: Send + Sync + 'static,
    E: Display + Send + Sync + 'static,
{
    match result {
        Ok(value) => {
            let value = Arc::new(value);
            if let Some(cache) = cache.upgrade() {
                cache.store(ticket, &value);
            }
            Ok(value)
        }
        Err(error) => {
            tracing::warn!(id = ticket.id, error = %error, "Fetch failed, nothing cached");
            if let Some(cache) = cache.upgrade() {
                cache.release(ticket.id);
            }
            Err(Arc::new(error))
        }
    }
}
