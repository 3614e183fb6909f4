use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    computed_at: DateTime<Utc>,
}

/// Last computed value per key, with an explicit freshness window.
///
/// Callers pass `now` in so they decide when a refresh is due; the cache
/// never recomputes anything on its own.
#[derive(Clone)]
pub struct FreshnessCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<K, V> FreshnessCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now - entry.computed_at < self.ttl
    }

    /// Returns the cached value only while it is still fresh at `now`.
    pub async fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if self.is_fresh(entry, now) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry stale for key: {:?}", key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    /// True when `key` has no entry or its entry is older than the ttl.
    pub async fn is_stale(&self, key: &K, now: DateTime<Utc>) -> bool {
        let cache = self.inner.lock().await;
        cache
            .get(key)
            .is_none_or(|entry| !self.is_fresh(entry, now))
    }

    /// When `key` was last computed, fresh or not.
    pub async fn computed_at(&self, key: &K) -> Option<DateTime<Utc>> {
        let cache = self.inner.lock().await;
        cache.get(key).map(|entry| entry.computed_at)
    }

    pub async fn put(&self, key: K, value: V, computed_at: DateTime<Utc>) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, CacheEntry { value, computed_at });
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_704_067_200 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_missing_key_is_stale() {
        let cache = FreshnessCache::<String, i32>::new(Duration::seconds(60));
        assert!(cache.is_stale(&"cu0/al0".to_string(), at(0)).await);
        assert!(cache.get(&"cu0/al0".to_string(), at(0)).await.is_none());
        assert!(cache.computed_at(&"cu0/al0".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_fresh_within_ttl() {
        let cache = FreshnessCache::<String, i32>::new(Duration::seconds(60));
        let key = "cu0/al0".to_string();
        cache.put(key.clone(), 7, at(0)).await;

        assert!(!cache.is_stale(&key, at(59)).await);
        assert_eq!(cache.get(&key, at(59)).await, Some(7));
        assert_eq!(cache.computed_at(&key).await, Some(at(0)));
    }

    #[tokio::test]
    async fn test_entry_stale_after_ttl() {
        let cache = FreshnessCache::<String, i32>::new(Duration::seconds(60));
        let key = "cu0/al0".to_string();
        cache.put(key.clone(), 7, at(0)).await;

        assert!(cache.is_stale(&key, at(60)).await);
        assert!(cache.get(&key, at(61)).await.is_none());

        cache.put(key.clone(), 8, at(61)).await;
        assert_eq!(cache.get(&key, at(62)).await, Some(8));
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let cache = FreshnessCache::<String, i32>::new(Duration::seconds(60));
        cache.put("a".to_string(), 1, at(0)).await;
        cache.put("b".to_string(), 2, at(0)).await;

        cache.clear().await;

        assert!(cache.is_stale(&"a".to_string(), at(1)).await);
        assert!(cache.is_stale(&"b".to_string(), at(1)).await);
    }
}
