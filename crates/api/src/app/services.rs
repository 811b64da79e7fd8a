//! Backend wiring: in-memory for dev/tests, Postgres (+ optional Redis)
//! when `USE_PERSISTENT_STORES=true`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use corebank_core::{Account, AccountNumber, AccountRef, AccountType, Currency, Money, OwnerId, TransactionRecord};
use corebank_infra::{DocumentRenderer, InMemoryLedgerCache, InMemoryLedgerStore, PostgresLedgerStore};
#[cfg(feature = "redis")]
use corebank_infra::RedisLedgerCache;
use corebank_ledger::{
    CacheError, ExportFormat, HistoryPage, HistoryQuery, Ledger, LedgerCache, LedgerConfig,
    LedgerError, NoopCache, RenderedStatement,
};

/// Cache tier for persistent mode: Redis when configured, no-op otherwise.
/// The ledger is correct either way; the tier only buys speed.
pub enum PersistentCache {
    #[cfg(feature = "redis")]
    Redis(RedisLedgerCache),
    Noop(NoopCache),
}

#[async_trait::async_trait]
impl LedgerCache for PersistentCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self {
            #[cfg(feature = "redis")]
            PersistentCache::Redis(cache) => cache.get(key).await,
            PersistentCache::Noop(cache) => cache.get(key).await,
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        match self {
            #[cfg(feature = "redis")]
            PersistentCache::Redis(cache) => cache.put(key, value, ttl).await,
            PersistentCache::Noop(cache) => cache.put(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            #[cfg(feature = "redis")]
            PersistentCache::Redis(cache) => cache.delete(key).await,
            PersistentCache::Noop(cache) => cache.delete(key).await,
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        match self {
            #[cfg(feature = "redis")]
            PersistentCache::Redis(cache) => cache.delete_prefix(prefix).await,
            PersistentCache::Noop(cache) => cache.delete_prefix(prefix).await,
        }
    }
}

pub enum AppServices {
    InMemory {
        ledger: Ledger<Arc<InMemoryLedgerStore>, Arc<InMemoryLedgerCache>>,
    },
    Persistent {
        ledger: Ledger<PostgresLedgerStore, PersistentCache>,
    },
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        build_persistent_services().await
    } else {
        build_in_memory_services()
    }
}

fn build_in_memory_services() -> AppServices {
    let store = Arc::new(InMemoryLedgerStore::new());
    let cache = Arc::new(InMemoryLedgerCache::new());
    let ledger = Ledger::new(
        store,
        cache,
        Arc::new(DocumentRenderer::new()),
        LedgerConfig::from_env(),
    );
    AppServices::InMemory { ledger }
}

async fn build_persistent_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");
    let store = PostgresLedgerStore::new(pool);

    let cache = match std::env::var("REDIS_URL") {
        #[cfg(feature = "redis")]
        Ok(url) => match RedisLedgerCache::connect(&url).await {
            Ok(cache) => PersistentCache::Redis(cache),
            Err(e) => {
                tracing::warn!("redis unavailable ({e}); running without a cache tier");
                PersistentCache::Noop(NoopCache)
            }
        },
        _ => {
            tracing::warn!("REDIS_URL not set; running without a cache tier");
            PersistentCache::Noop(NoopCache)
        }
    };

    let ledger = Ledger::new(
        store,
        cache,
        Arc::new(DocumentRenderer::new()),
        LedgerConfig::from_env(),
    );
    AppServices::Persistent { ledger }
}

impl AppServices {
    pub async fn create_account(
        &self,
        owner_id: OwnerId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<Account, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => {
                ledger.create_account(owner_id, account_type, currency).await
            }
            AppServices::Persistent { ledger } => {
                ledger.create_account(owner_id, account_type, currency).await
            }
        }
    }

    pub async fn account(&self, account_ref: &AccountRef) -> Result<Account, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => ledger.account(account_ref).await,
            AppServices::Persistent { ledger } => ledger.account(account_ref).await,
        }
    }

    pub async fn update_account(
        &self,
        account_ref: &AccountRef,
        account_type: Option<AccountType>,
        currency: Option<Currency>,
    ) -> Result<Account, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => {
                ledger.update_account(account_ref, account_type, currency).await
            }
            AppServices::Persistent { ledger } => {
                ledger.update_account(account_ref, account_type, currency).await
            }
        }
    }

    pub async fn deposit(
        &self,
        account_ref: &AccountRef,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => {
                ledger.deposit(account_ref, amount, description).await
            }
            AppServices::Persistent { ledger } => {
                ledger.deposit(account_ref, amount, description).await
            }
        }
    }

    pub async fn withdraw(
        &self,
        account_ref: &AccountRef,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => {
                ledger.withdraw(account_ref, amount, description).await
            }
            AppServices::Persistent { ledger } => {
                ledger.withdraw(account_ref, amount, description).await
            }
        }
    }

    pub async fn transfer(
        &self,
        source_ref: &AccountRef,
        destination: &AccountNumber,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => {
                ledger.transfer(source_ref, destination, amount, description).await
            }
            AppServices::Persistent { ledger } => {
                ledger.transfer(source_ref, destination, amount, description).await
            }
        }
    }

    pub async fn history(
        &self,
        account_ref: &AccountRef,
        query: HistoryQuery,
    ) -> Result<HistoryPage, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => ledger.history(account_ref, query).await,
            AppServices::Persistent { ledger } => ledger.history(account_ref, query).await,
        }
    }

    pub async fn export(
        &self,
        account_ref: &AccountRef,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        format: ExportFormat,
    ) -> Result<RenderedStatement, LedgerError> {
        match self {
            AppServices::InMemory { ledger } => ledger.export(account_ref, from, to, format).await,
            AppServices::Persistent { ledger } => ledger.export(account_ref, from, to, format).await,
        }
    }
}
