//! `corebank-core` — domain foundation for the banking ledger.
//!
//! This crate contains **pure domain** types (no I/O, no async, no
//! infrastructure concerns): identifiers, money, accounts, transaction
//! records and the polymorphic account reference.

pub mod account;
pub mod account_ref;
pub mod error;
pub mod id;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountNumber, AccountType, Currency};
pub use account_ref::AccountRef;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, OwnerId, TransactionId};
pub use money::Money;
pub use transaction::{TransactionKind, TransactionRecord, TransactionStatus};
