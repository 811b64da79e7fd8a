//! Store capability: the system of record for accounts and transactions.
//!
//! The trait is deliberately small. The two commit operations are the only
//! writes that move money, and each one must apply its balance write(s) and
//! record append(s) in a single atomic unit: a reader never observes a
//! balance without its record, or one leg of a transfer without the other.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use corebank_core::{
    Account, AccountId, AccountNumber, AccountType, Currency, Money, OwnerId, TransactionRecord,
};

/// Store-level failure classes the core branches on.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The optimistic balance guard failed: the account changed between the
    /// core's read and the commit. The core re-reads and retries.
    #[error("account balance changed concurrently")]
    Conflict,

    /// The account-number unique constraint fired on insert.
    #[error("account number already exists")]
    DuplicateAccountNumber,

    /// The backing store failed. Retryable; no partial effect was left.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Inclusive timestamp window applied to history and export queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// One side of an atomic balance commit.
///
/// The store applies the balance write and the record append in a single
/// transaction, guarded by `expected_balance`: if the stored balance no
/// longer equals it, nothing is written and [`StoreError::Conflict`] comes
/// back. The guard is what serializes concurrent read-modify-write cycles
/// against the same account.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub account_id: AccountId,
    pub expected_balance: Money,
    pub new_balance: Money,
    pub record: TransactionRecord,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError>;

    async fn accounts_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, StoreError>;

    async fn update_metadata(
        &self,
        id: AccountId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<(), StoreError>;

    /// Atomically apply one balance change and append its record.
    async fn commit_entry(&self, entry: LedgerEntry) -> Result<TransactionRecord, StoreError>;

    /// Atomically apply both legs of a transfer; either both commit or
    /// neither does.
    async fn commit_transfer(
        &self,
        debit: LedgerEntry,
        credit: LedgerEntry,
    ) -> Result<(TransactionRecord, TransactionRecord), StoreError>;

    /// One history page (newest first) plus the total matching count.
    async fn transactions_page(
        &self,
        account_id: AccountId,
        range: DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError>;

    /// The full filtered record set (newest first), for statement export.
    async fn transactions_in_range(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<TransactionRecord>, StoreError>;
}

/// Shared handles are stores too, so wiring and tests can keep a reference
/// to the same backend they hand to the ledger.
#[async_trait]
impl<T: LedgerStore + ?Sized> LedgerStore for std::sync::Arc<T> {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        (**self).insert_account(account).await
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        (**self).account_by_id(id).await
    }

    async fn account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError> {
        (**self).account_by_number(number).await
    }

    async fn accounts_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, StoreError> {
        (**self).accounts_by_owner(owner_id).await
    }

    async fn update_metadata(
        &self,
        id: AccountId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<(), StoreError> {
        (**self).update_metadata(id, account_type, currency).await
    }

    async fn commit_entry(&self, entry: LedgerEntry) -> Result<TransactionRecord, StoreError> {
        (**self).commit_entry(entry).await
    }

    async fn commit_transfer(
        &self,
        debit: LedgerEntry,
        credit: LedgerEntry,
    ) -> Result<(TransactionRecord, TransactionRecord), StoreError> {
        (**self).commit_transfer(debit, credit).await
    }

    async fn transactions_page(
        &self,
        account_id: AccountId,
        range: DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError> {
        (**self)
            .transactions_page(account_id, range, offset, limit)
            .await
    }

    async fn transactions_in_range(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        (**self).transactions_in_range(account_id, range).await
    }
}
