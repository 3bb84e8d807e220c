use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// A bounded cache whose entries expire after a fixed time-to-live.
///
/// Lookups never return values older than the TTL, so a stale entry is at
/// most `ttl` behind whatever was last written. Capacity evicts in LRU
/// order once the bound is reached.
pub struct TtlCache<K, V> {
    entries: Mutex<LruCache<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        TtlCache {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, stored_at)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().await;
        entries.put(key, (value, Instant::now()));
    }
}

#[cfg(test)]
mod cache_tests {
    use super::TtlCache;
    use std::num::NonZeroUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = TtlCache::new(NonZeroUsize::new(4).unwrap(), Duration::from_millis(10));
        cache.put("key".to_string(), "value".to_string()).await;
        assert_eq!(
            cache.get(&"key".to_string()).await,
            Some("value".to_string())
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            cache.get(&"key".to_string()).await,
            None,
            "entry should expire after the TTL"
        );
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let cache = TtlCache::new(NonZeroUsize::new(2).unwrap(), Duration::from_secs(60));
        cache.put(1, "a").await;
        cache.put(2, "b").await;
        cache.put(3, "c").await;

        assert_eq!(cache.get(&1).await, None, "oldest entry should be evicted");
        assert_eq!(cache.get(&2).await, Some("b"));
        assert_eq!(cache.get(&3).await, Some("c"));
    }
}
