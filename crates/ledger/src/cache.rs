//! Cache capability and the ledger's key scheme.
//!
//! The cache accelerates reads; it is never a source of truth. Every entry
//! moves through `absent -> populated -> (expired | invalidated) -> absent`:
//! populated on the first read-through after a miss, invalidated eagerly by
//! any balance mutation of the keyed account. Failures surface as
//! [`CacheError`] and the core degrades to direct store access.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Cache-tier failure. Degrades performance, never correctness.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LedgerCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Drop every entry whose key starts with `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: LedgerCache + ?Sized> LedgerCache for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        (**self).put(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        (**self).delete_prefix(prefix).await
    }
}

/// Cache tier that stores nothing, for deployments without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl LedgerCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete_prefix(&self, _prefix: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Key scheme.
///
/// Every key for an account lives under a prefix that a mutation can
/// invalidate wholesale; range bounds are millisecond stamps so distinct
/// windows never collide.
pub mod keys {
    use chrono::{DateTime, Utc};

    use corebank_core::{AccountId, AccountNumber};

    use crate::export::ExportFormat;
    use crate::store::DateRange;

    pub fn account_snapshot(id: AccountId) -> String {
        format!("account:{id}")
    }

    pub fn account_snapshot_by_number(number: &AccountNumber) -> String {
        format!("account:number:{number}")
    }

    pub fn history_prefix(id: AccountId) -> String {
        format!("history:{id}:")
    }

    pub fn history_page(id: AccountId, page: u32, page_size: u32, range: DateRange) -> String {
        format!(
            "history:{id}:{page}:{page_size}:{}:{}",
            stamp(range.from),
            stamp(range.to)
        )
    }

    pub fn export_prefix(id: AccountId) -> String {
        format!("export:{id}:")
    }

    pub fn export(id: AccountId, range: DateRange, format: ExportFormat) -> String {
        format!(
            "export:{id}:{}:{}:{}",
            stamp(range.from),
            stamp(range.to),
            format.as_str()
        )
    }

    fn stamp(t: Option<DateTime<Utc>>) -> String {
        t.map(|t| t.timestamp_millis().to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corebank_core::AccountId;

    use crate::export::ExportFormat;
    use crate::store::DateRange;

    #[test]
    fn history_keys_live_under_the_invalidation_prefix() {
        let id = AccountId::new();
        let key = keys::history_page(id, 1, 20, DateRange::default());
        assert!(key.starts_with(&keys::history_prefix(id)));
        assert_eq!(key, format!("history:{id}:1:20:-:-"));
    }

    #[test]
    fn export_keys_live_under_the_invalidation_prefix() {
        let id = AccountId::new();
        let key = keys::export(id, DateRange::default(), ExportFormat::Csv);
        assert!(key.starts_with(&keys::export_prefix(id)));
        assert!(key.ends_with(":csv"));
    }

    #[test]
    fn distinct_ranges_get_distinct_keys() {
        let id = AccountId::new();
        let a = DateRange {
            from: Some(chrono::Utc::now()),
            to: None,
        };
        let b = DateRange {
            from: Some(chrono::Utc::now() + chrono::Duration::milliseconds(1)),
            to: None,
        };
        assert_ne!(
            keys::history_page(id, 1, 20, a),
            keys::history_page(id, 1, 20, b)
        );
    }
}
