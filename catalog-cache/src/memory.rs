//! In-memory cache backend.
//!
//! A `RwLock<HashMap>` with per-entry expiry instants. Used by tests and by
//! dev mode when no Redis is configured. Expired entries are treated as
//! absent on read and purged opportunistically on write.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{CacheError, CacheResult};
use crate::traits::CacheStore;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache store with TTL semantics.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries. A poisoned lock counts as empty.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Glob matching with `*` (any run) and `?` (any single char), the subset of
/// Redis KEYS patterns the catalog uses.
fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();

    // Iterative matcher with backtracking over the last `*`.
    let (mut pi, mut ki) = (0usize, 0usize);
    let (mut star, mut star_ki) = (None::<usize>, 0usize);

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            star_ki = ki;
            pi += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            star_ki += 1;
            ki = star_ki;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CacheError::unavailable("cache lock poisoned"))?;
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(Instant::now()))
            .map(|e| e.value.clone()))
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let ttl = ttl.max(Duration::from_secs(1));
        let now = Instant::now();
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::unavailable("cache lock poisoned"))?;
        entries.retain(|_, e| !e.is_expired(now));
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::unavailable("cache lock poisoned"))?;
        Ok(match entries.remove(key) {
            Some(e) if !e.is_expired(Instant::now()) => 1,
            _ => 0,
        })
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let now = Instant::now();
        let entries = self
            .entries
            .read()
            .map_err(|_| CacheError::unavailable("cache lock poisoned"))?;
        Ok(entries
            .iter()
            .filter(|(_, e)| !e.is_expired(now))
            .filter(|(k, _)| glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn ping(&self) -> CacheResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("products:*", "products:all"));
        assert!(glob_match("products:*", "products:search:widget"));
        assert!(!glob_match("products:*", "sessions:all"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("products:categor?:tools", "products:category:tools"));
        assert!(!glob_match("products:all", "products:all:extra"));
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCacheStore::new();
        cache
            .set_with_ttl("k", b"v".to_vec(), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert_eq!(cache.delete("k").await.unwrap(), 1);
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert_eq!(cache.delete("k").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCacheStore::new();
        cache
            .set_with_ttl("k", b"v".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(cache.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.keys("*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_pattern() {
        let cache = MemoryCacheStore::new();
        let ttl = Duration::from_secs(30);
        cache.set_with_ttl("products:all", b"a".to_vec(), ttl).await.unwrap();
        cache
            .set_with_ttl("products:search:x", b"b".to_vec(), ttl)
            .await
            .unwrap();
        cache.set_with_ttl("other:key", b"c".to_vec(), ttl).await.unwrap();

        let deleted = cache.delete_by_pattern("products:*").await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(cache.get("other:key").await.unwrap(), Some(b"c".to_vec()));
        assert_eq!(cache.get("products:all").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_enumeration() {
        let cache = MemoryCacheStore::new();
        let ttl = Duration::from_secs(30);
        cache.set_with_ttl("products:all", b"a".to_vec(), ttl).await.unwrap();
        cache
            .set_with_ttl("products:category:tools", b"b".to_vec(), ttl)
            .await
            .unwrap();

        let mut keys = cache.keys("products:*").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["products:all", "products:category:tools"]);
    }
}
