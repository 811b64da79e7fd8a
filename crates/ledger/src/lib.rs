//! `corebank-ledger` — the ledger core.
//!
//! Owns balance mutation and transaction-record creation for deposits,
//! withdrawals and transfers, plus history and statement-export queries, in
//! front of injected store/cache capabilities. The stores are the only
//! source of truth; the cache is disposable and every path stays correct
//! when it is a no-op.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod ops;
pub mod replay;
pub mod store;

pub use cache::{CacheError, LedgerCache, NoopCache};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use export::{ExportFormat, RenderError, RenderedStatement, Statement, StatementRenderer};
pub use history::{HistoryPage, HistoryQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use ops::Ledger;
pub use store::{DateRange, LedgerEntry, LedgerStore, StoreError};
