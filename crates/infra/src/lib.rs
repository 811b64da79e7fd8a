//! `corebank-infra` — collaborator implementations behind the ledger seams.
//!
//! Postgres system of record, Redis cache tier (feature `redis`), in-memory
//! backends for tests and development, and the statement renderers.

pub mod cache;
pub mod export;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use cache::memory::InMemoryLedgerCache;
#[cfg(feature = "redis")]
pub use cache::redis::RedisLedgerCache;
pub use export::DocumentRenderer;
pub use store::memory::InMemoryLedgerStore;
pub use store::postgres::PostgresLedgerStore;
