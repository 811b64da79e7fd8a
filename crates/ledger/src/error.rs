//! The ledger operation error taxonomy.
//!
//! Every operation returns either a concrete result or one of these named
//! conditions; callers branch on the variant, never on message text. Cache
//! failures never appear here: the core logs them and falls back to the
//! store.

use thiserror::Error;

use corebank_core::{AccountType, Money};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The account reference or number did not resolve.
    #[error("account not found")]
    AccountNotFound,

    /// The amount was non-positive or above the configured ceiling.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A withdrawal or transfer would take the balance below zero. Nothing
    /// was written.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: Money, requested: Money },

    /// Source and destination of a transfer resolved to the same account.
    #[error("source and destination are the same account")]
    SameAccountTransfer,

    /// The owner already holds an account of this type.
    #[error("owner already holds a {} account", .0.as_str())]
    DuplicateAccountType(AccountType),

    /// The requested window starts after it ends.
    #[error("date range start is after its end")]
    InvalidDateRange,

    /// The export matched nothing. An empty-result signal, not a failure.
    #[error("no matching transactions")]
    NoData,

    /// The statement renderer failed (distinct from `NoData`).
    #[error("statement rendering failed: {0}")]
    ExportFailed(String),

    /// The system of record failed; see [`StoreError`] for the class.
    #[error(transparent)]
    Store(#[from] StoreError),
}
