//! TTL-aware in-memory cache for tests and development.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use corebank_ledger::{CacheError, LedgerCache};

#[derive(Debug, Default)]
pub struct InMemoryLedgerCache {
    inner: Mutex<HashMap<String, (String, Instant)>>,
}

impl InMemoryLedgerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live (unexpired) entry exists for `key` (test helper).
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|(_, expires)| *expires > Instant::now())
    }

    /// Number of live entries (test helper).
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .unwrap()
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerCache for InMemoryLedgerCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut inner = self.inner.lock().unwrap();
        let expired = matches!(inner.get(key), Some((_, expires)) if *expires <= Instant::now());
        if expired {
            inner.remove(key);
            return Ok(None);
        }
        Ok(inner.get(key).map(|(value, _)| value.clone()))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner
            .lock()
            .unwrap()
            .insert(key.to_string(), (value, Instant::now() + ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.lock().unwrap().remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        self.inner
            .lock()
            .unwrap()
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire_and_prefix_deletion_sweeps() {
        let cache = InMemoryLedgerCache::new();

        cache
            .put("history:a:1", "x".into(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("history:a:2", "y".into(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("account:a", "z".into(), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("history:a:1").await.unwrap().as_deref(), Some("x"));

        cache.delete_prefix("history:a:").await.unwrap();
        assert_eq!(cache.get("history:a:1").await.unwrap(), None);
        assert_eq!(cache.get("history:a:2").await.unwrap(), None);
        assert_eq!(cache.get("account:a").await.unwrap().as_deref(), Some("z"));

        cache
            .put("gone", "v".into(), Duration::from_millis(0))
            .await
            .unwrap();
        assert_eq!(cache.get("gone").await.unwrap(), None);
    }
}
