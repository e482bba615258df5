//! Memoizing cache for values that never change within a session.
//!
//! Each key owns a `OnceCell`, so concurrent lookups of the same missing key
//! share one initialization. A failed initialization stores nothing; the
//! next caller tries again.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

/// A thread-safe, lazily populated cache without expiry.
pub struct MemoCache<K, V> {
    cells: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// Return the cached value or run `init` to produce it.
    ///
    /// Callers racing on the same key wait for the first `init` to finish
    /// instead of starting their own.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // The map guard must not be held across the await below.
        let cell = Arc::clone(
            self.cells
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );
        cell.get_or_try_init(init).await.cloned()
    }

    /// Get a value if it has been populated.
    pub fn get(&self, key: &K) -> Option<V> {
        self.cells
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Check if a populated value exists for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.cells
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
