//! TTL cache with single-flight fetches.
//!
//! Remote suggestion lookups are slow relative to keystrokes, so results are
//! memoized per key for a bounded window. The in-flight table holds a shared
//! future per key: concurrent callers for the same key join one underlying
//! fetch and all receive its result. Whatever the fetch returns is committed,
//! empty results included, so a failing source is not hammered on every
//! keystroke.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::debug;

use super::Suggestion;

/// Default freshness window for a committed entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default age at which the periodic sweep drops an entry outright.
pub const DEFAULT_PURGE_AFTER: Duration = Duration::from_secs(10 * 60);

type SharedFetch = Shared<BoxFuture<'static, Vec<Suggestion>>>;

struct CacheEntry {
    value: Vec<Suggestion>,
    created_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, SharedFetch>,
}

/// Process-lifetime memoization store for suggestion lookups.
///
/// Shared between the foreground completion path and the background prefetch
/// task; all state sits behind one mutex, held only for map operations, never
/// across an await.
pub struct SuggestionCache {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
    purge_after: Duration,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL, DEFAULT_PURGE_AFTER)
    }

    /// Construct with explicit windows. Tests use millisecond values.
    pub fn with_ttl(ttl: Duration, purge_after: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
            purge_after,
        }
    }

    /// Return the live value for `key`, joining an in-flight fetch if one
    /// exists, otherwise invoking `fetch` and committing its result.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Vec<Suggestion>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Suggestion>> + Send + 'static,
    {
        let shared = {
            let mut inner = self.inner.lock();

            if let Some(entry) = inner.entries.get(key) {
                if entry.created_at.elapsed() < self.ttl {
                    return entry.value.clone();
                }
                // Stale entries are logically absent; the next commit
                // replaces them.
            }

            if let Some(existing) = inner.in_flight.get(key) {
                debug!(key, "joining in-flight fetch");
                existing.clone()
            } else {
                let store = Arc::clone(&self.inner);
                let owned = key.to_string();
                let fut = fetch();
                let shared: SharedFetch = async move {
                    let value = fut.await;
                    let mut inner = store.lock();
                    inner.entries.insert(
                        owned.clone(),
                        CacheEntry {
                            value: value.clone(),
                            created_at: Instant::now(),
                        },
                    );
                    inner.in_flight.remove(&owned);
                    value
                }
                .boxed()
                .shared();
                inner.in_flight.insert(key.to_string(), shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Drop entries older than the purge window. A key with an in-flight
    /// fetch is left alone; its entry is about to be replaced anyway.
    pub fn sweep(&self) {
        let mut inner = self.inner.lock();
        let in_flight: Vec<String> = inner.in_flight.keys().cloned().collect();
        let purge_after = self.purge_after;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|key, entry| {
                entry.created_at.elapsed() < purge_after || in_flight.contains(key)
            });
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!(removed, "swept stale cache entries");
        }
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SuggestionCache {
    fn default() -> Self {
        Self::new()
    }
}
