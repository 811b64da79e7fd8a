//! Redis-backed cache tier (feature `redis`).
//!
//! Uses a multiplexed connection manager. Prefix invalidation walks the
//! keyspace with SCAN/MATCH and deletes in batches; entry expiry is Redis
//! `SET EX`, so even a missed invalidation ages out.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use corebank_ledger::{CacheError, LedgerCache};

#[derive(Clone)]
pub struct RedisLedgerCache {
    conn: ConnectionManager,
}

impl RedisLedgerCache {
    /// Connect to `redis_url` (e.g. `redis://localhost:6379`).
    pub async fn connect(redis_url: impl AsRef<str>) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url.as_ref()).map_err(to_cache_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(to_cache_error)?;
        Ok(Self { conn })
    }
}

fn to_cache_error(err: redis::RedisError) -> CacheError {
    CacheError::Unavailable(err.to_string())
}

#[async_trait]
impl LedgerCache for RedisLedgerCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(to_cache_error)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(to_cache_error)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(to_cache_error)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(to_cache_error)?;
            if !keys.is_empty() {
                conn.del::<_, ()>(keys).await.map_err(to_cache_error)?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(())
    }
}
