//! Counter Store
//!
//! In-memory window counters keyed by `(client, quota class)`. The
//! check-and-increment runs under a single write-lock acquisition so a
//! window's quota cannot be exceeded by concurrent requests.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::quota::{QuotaClass, WindowCounter};

/// Key identifying one client's counter for one quota class
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CounterKey {
    /// Client identity the counter belongs to
    pub client_id: String,

    /// Quota class the counter tracks
    pub class: QuotaClass,
}

impl CounterKey {
    /// Create a counter key
    pub fn new(client_id: &str, class: QuotaClass) -> Self {
        Self {
            client_id: client_id.to_string(),
            class,
        }
    }
}

/// In-memory store of per-key window counters
#[derive(Debug, Clone)]
pub struct CounterStore {
    counters: Arc<RwLock<HashMap<CounterKey, WindowCounter>>>,
}

impl CounterStore {
    /// Create an empty counter store
    pub fn new() -> Self {
        Self {
            counters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Atomically count one request against `key` for `window`.
    ///
    /// A counter from an earlier window is discarded before counting.
    /// Returns whether the request was admitted and the post-increment
    /// count for the window.
    pub async fn check_and_increment(
        &self,
        key: CounterKey,
        limit: u32,
        window: i64,
    ) -> (bool, u32) {
        let mut counters = self.counters.write().await;
        let entry = counters
            .entry(key)
            .or_insert_with(|| WindowCounter::new(window));

        if entry.window != window {
            *entry = WindowCounter::new(window);
        }

        if entry.count < limit {
            entry.count += 1;
            (true, entry.count)
        } else {
            (false, entry.count)
        }
    }

    /// Drop every counter belonging to `client_id`
    pub async fn reset_client(&self, client_id: &str) {
        let mut counters = self.counters.write().await;
        counters.retain(|key, _| key.client_id != client_id);
    }

    /// Drop all counters
    pub async fn clear(&self) {
        let mut counters = self.counters.write().await;
        counters.clear();
    }

    /// Number of live counters
    pub async fn len(&self) -> usize {
        let counters = self.counters.read().await;
        counters.len()
    }

    /// True when no counters are tracked
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_within_window() {
        let store = CounterStore::new();
        let key = CounterKey::new("client-1", QuotaClass::per_second(2));

        assert_eq!(store.check_and_increment(key.clone(), 2, 7).await, (true, 1));
        assert_eq!(store.check_and_increment(key.clone(), 2, 7).await, (true, 2));
        assert_eq!(store.check_and_increment(key, 2, 7).await, (false, 2));
    }

    #[tokio::test]
    async fn test_window_roll_resets_count() {
        let store = CounterStore::new();
        let key = CounterKey::new("client-1", QuotaClass::per_second(1));

        assert_eq!(store.check_and_increment(key.clone(), 1, 7).await, (true, 1));
        assert_eq!(store.check_and_increment(key.clone(), 1, 7).await, (false, 1));
        // Next window admits again
        assert_eq!(store.check_and_increment(key, 1, 8).await, (true, 1));
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let store = CounterStore::new();
        let class = QuotaClass::per_second(1);

        let a = CounterKey::new("client-a", class);
        let b = CounterKey::new("client-b", class);

        assert!(store.check_and_increment(a.clone(), 1, 7).await.0);
        assert!(!store.check_and_increment(a, 1, 7).await.0);
        assert!(store.check_and_increment(b, 1, 7).await.0);
    }

    #[tokio::test]
    async fn test_reset_client_drops_only_that_client() {
        let store = CounterStore::new();
        let class = QuotaClass::per_second(1);

        store
            .check_and_increment(CounterKey::new("client-a", class), 1, 7)
            .await;
        store
            .check_and_increment(CounterKey::new("client-b", class), 1, 7)
            .await;
        assert_eq!(store.len().await, 2);

        store.reset_client("client-a").await;
        assert_eq!(store.len().await, 1);

        // client-a starts a fresh count
        assert!(
            store
                .check_and_increment(CounterKey::new("client-a", class), 1, 7)
                .await
                .0
        );
    }

    #[tokio::test]
    async fn test_clear() {
        let store = CounterStore::new();
        store
            .check_and_increment(CounterKey::new("client-a", QuotaClass::per_hour(10)), 10, 0)
            .await;
        assert!(!store.is_empty().await);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
