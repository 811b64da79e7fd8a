//! The ledger operations: account lifecycle, deposit, withdraw, transfer,
//! history and export.
//!
//! Every mutation follows the same cycle: resolve the account fresh from the
//! store, validate against that balance, then hand the store an atomic
//! commit conditioned on it. A lost race surfaces as a store conflict and
//! the cycle repeats, so the validation is always evaluated against the
//! balance the commit is conditioned on.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use corebank_core::{
    Account, AccountId, AccountNumber, AccountRef, AccountType, Currency, Money, OwnerId,
    TransactionId, TransactionKind, TransactionRecord, TransactionStatus,
    transaction::clamp_description,
};

use crate::cache::{LedgerCache, keys};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::export::{self, ExportFormat, RenderedStatement, Statement, StatementRenderer};
use crate::history::{HistoryPage, HistoryQuery};
use crate::store::{DateRange, LedgerEntry, LedgerStore, StoreError};

/// Attempts at drawing a unique account number before giving up.
const NUMBER_ATTEMPTS: u32 = 8;

/// The ledger core.
///
/// Orchestrates the account/transaction store and the read-through cache;
/// the store stays the only source of truth.
pub struct Ledger<S, C> {
    store: S,
    cache: C,
    renderer: Arc<dyn StatementRenderer>,
    config: LedgerConfig,
}

impl<S, C> Ledger<S, C>
where
    S: LedgerStore,
    C: LedgerCache,
{
    pub fn new(
        store: S,
        cache: C,
        renderer: Arc<dyn StatementRenderer>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            store,
            cache,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ---- account lifecycle ----

    /// Open an account with a zero balance and a fresh unique number.
    ///
    /// An owner holds at most one account per type.
    pub async fn create_account(
        &self,
        owner_id: OwnerId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<Account, LedgerError> {
        let existing = self.store.accounts_by_owner(owner_id).await?;
        if existing.iter().any(|a| a.account_type == account_type) {
            warn!(%owner_id, account_type = account_type.as_str(), "account creation rejected: duplicate type");
            return Err(LedgerError::DuplicateAccountType(account_type));
        }

        for _ in 0..NUMBER_ATTEMPTS {
            let account = Account {
                id: AccountId::new(),
                owner_id,
                number: AccountNumber::generate(),
                account_type,
                currency: currency.clone(),
                balance: Money::ZERO,
                created_at: Utc::now(),
            };
            match self.store.insert_account(&account).await {
                Ok(()) => {
                    info!(account_id = %account.id, number = %account.number, "account created");
                    self.write_snapshot(&account).await;
                    return Ok(account);
                }
                // collision: draw a fresh number
                Err(StoreError::DuplicateAccountNumber) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::DuplicateAccountNumber.into())
    }

    /// Current account snapshot, served read-through from the cache.
    pub async fn account(&self, account_ref: &AccountRef) -> Result<Account, LedgerError> {
        let key = match account_ref {
            AccountRef::Id(id) => keys::account_snapshot(*id),
            AccountRef::Number(number) => keys::account_snapshot_by_number(number),
        };
        if let Some(account) = self.cache_read::<Account>(&key).await {
            return Ok(account);
        }
        let account = self.resolve(account_ref).await?;
        self.write_snapshot(&account).await;
        Ok(account)
    }

    /// Update account metadata (type and/or currency).
    ///
    /// Invalidates the snapshot keys only; history pages stay valid because
    /// no balance moved.
    pub async fn update_account(
        &self,
        account_ref: &AccountRef,
        account_type: Option<AccountType>,
        currency: Option<Currency>,
    ) -> Result<Account, LedgerError> {
        let mut account = self.resolve(account_ref).await?;

        if let Some(new_type) = account_type {
            if new_type != account.account_type {
                let siblings = self.store.accounts_by_owner(account.owner_id).await?;
                if siblings
                    .iter()
                    .any(|a| a.id != account.id && a.account_type == new_type)
                {
                    return Err(LedgerError::DuplicateAccountType(new_type));
                }
                account.account_type = new_type;
            }
        }
        if let Some(new_currency) = currency {
            account.currency = new_currency;
        }

        self.store
            .update_metadata(account.id, account.account_type, account.currency.clone())
            .await?;
        self.drop_snapshot(&account).await;
        info!(account_id = %account.id, "account metadata updated");
        Ok(account)
    }

    // ---- money movement ----

    pub async fn deposit(
        &self,
        account_ref: &AccountRef,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        Self::require_positive(amount)?;
        let description = clamp_description(description.as_deref().unwrap_or("Deposit"));

        for _ in 0..self.config.commit_retries {
            let account = self.resolve(account_ref).await?;
            let new_balance = Self::credit(account.balance, amount)?;
            let record = Self::record(
                &account,
                TransactionKind::Deposit,
                amount,
                &description,
                None,
                new_balance,
            );
            match self
                .store
                .commit_entry(Self::entry(&account, new_balance, record))
                .await
            {
                Ok(committed) => {
                    info!(account_id = %account.id, %amount, balance = %new_balance, "deposit committed");
                    self.invalidate_account(&account).await;
                    return Ok(committed);
                }
                Err(StoreError::Conflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::Conflict.into())
    }

    pub async fn withdraw(
        &self,
        account_ref: &AccountRef,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        Self::require_positive(amount)?;
        let description = clamp_description(description.as_deref().unwrap_or("Withdrawal"));

        for _ in 0..self.config.commit_retries {
            let account = self.resolve(account_ref).await?;
            if account.balance < amount {
                warn!(account_id = %account.id, balance = %account.balance, %amount, "withdrawal rejected: insufficient balance");
                return Err(LedgerError::InsufficientBalance {
                    available: account.balance,
                    requested: amount,
                });
            }
            let new_balance = Self::debit(account.balance, amount)?;
            let record = Self::record(
                &account,
                TransactionKind::Withdrawal,
                amount,
                &description,
                None,
                new_balance,
            );
            match self
                .store
                .commit_entry(Self::entry(&account, new_balance, record))
                .await
            {
                Ok(committed) => {
                    info!(account_id = %account.id, %amount, balance = %new_balance, "withdrawal committed");
                    self.invalidate_account(&account).await;
                    return Ok(committed);
                }
                Err(StoreError::Conflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::Conflict.into())
    }

    /// Move money between two accounts; the destination is addressed by its
    /// public number, the way a payer addresses a counterparty.
    ///
    /// Produces exactly two records, both `Transfer`-typed, carrying each
    /// other's account number; they commit together or not at all. The debit
    /// leg is returned to the caller.
    pub async fn transfer(
        &self,
        source_ref: &AccountRef,
        destination: &AccountNumber,
        amount: Money,
        description: Option<String>,
    ) -> Result<TransactionRecord, LedgerError> {
        Self::require_positive(amount)?;
        if amount > self.config.max_transfer_amount {
            return Err(LedgerError::InvalidAmount(format!(
                "amount {amount} exceeds the per-transfer ceiling {}",
                self.config.max_transfer_amount
            )));
        }
        let description = clamp_description(description.as_deref().unwrap_or("Transfer"));

        for _ in 0..self.config.commit_retries {
            let source = self.resolve(source_ref).await?;
            let destination = self
                .store
                .account_by_number(destination)
                .await?
                .ok_or(LedgerError::AccountNotFound)?;

            if source.id == destination.id {
                return Err(LedgerError::SameAccountTransfer);
            }
            if source.balance < amount {
                warn!(source = %source.id, balance = %source.balance, %amount, "transfer rejected: insufficient balance");
                return Err(LedgerError::InsufficientBalance {
                    available: source.balance,
                    requested: amount,
                });
            }

            let source_balance = Self::debit(source.balance, amount)?;
            let destination_balance = Self::credit(destination.balance, amount)?;

            let debit_record = Self::record(
                &source,
                TransactionKind::Transfer,
                amount,
                &description,
                Some(destination.number.clone()),
                source_balance,
            );
            let credit_record = Self::record(
                &destination,
                TransactionKind::Transfer,
                amount,
                &clamp_description(&format!("Transfer from {}", source.number)),
                Some(source.number.clone()),
                destination_balance,
            );

            match self
                .store
                .commit_transfer(
                    Self::entry(&source, source_balance, debit_record),
                    Self::entry(&destination, destination_balance, credit_record),
                )
                .await
            {
                Ok((debit_leg, _credit_leg)) => {
                    info!(source = %source.id, destination = %destination.id, %amount, "transfer committed");
                    self.invalidate_account(&source).await;
                    self.invalidate_account(&destination).await;
                    return Ok(debit_leg);
                }
                Err(StoreError::Conflict) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::Conflict.into())
    }

    // ---- queries ----

    /// One page of transaction history, newest first, date-filtered.
    ///
    /// The range is validated before anything touches the store; an
    /// out-of-range page returns empty items with the true total.
    pub async fn history(
        &self,
        account_ref: &AccountRef,
        query: HistoryQuery,
    ) -> Result<HistoryPage, LedgerError> {
        let range = Self::require_range(query.from, query.to)?;
        let account = self.resolve(account_ref).await?;
        let query = query.clamped();

        let key = keys::history_page(account.id, query.page, query.page_size, range);
        if let Some(page) = self.cache_read::<HistoryPage>(&key).await {
            return Ok(page);
        }

        let offset = u64::from(query.page - 1) * u64::from(query.page_size);
        let (items, total) = self
            .store
            .transactions_page(account.id, range, offset, u64::from(query.page_size))
            .await?;
        let page = HistoryPage {
            page: query.page,
            page_size: query.page_size,
            total,
            items,
        };
        self.cache_write(&key, &page, self.config.history_ttl).await;
        Ok(page)
    }

    /// Render the full filtered history into a statement artifact.
    ///
    /// An empty range is [`LedgerError::NoData`], distinct from a renderer
    /// failure, so callers can tell an empty statement from a broken export.
    pub async fn export(
        &self,
        account_ref: &AccountRef,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        format: ExportFormat,
    ) -> Result<RenderedStatement, LedgerError> {
        let range = Self::require_range(from, to)?;
        let account = self.resolve(account_ref).await?;

        let key = keys::export(account.id, range, format);
        if let Some(rendered) = self.cache_read::<RenderedStatement>(&key).await {
            return Ok(rendered);
        }

        let lines = self.store.transactions_in_range(account.id, range).await?;
        if lines.is_empty() {
            return Err(LedgerError::NoData);
        }

        let statement = Statement {
            account_number: account.number.clone(),
            currency: account.currency.clone(),
            from: range.from,
            to: range.to,
            lines,
        };
        let bytes = self
            .renderer
            .render(&statement, format)
            .map_err(|e| LedgerError::ExportFailed(e.to_string()))?;
        let rendered = RenderedStatement {
            bytes,
            content_type: format.content_type().to_string(),
            file_name: export::file_name(&statement, format),
        };
        self.cache_write(&key, &rendered, self.config.export_ttl).await;
        info!(
            account_id = %account.id,
            format = format.as_str(),
            lines = statement.lines.len(),
            "statement exported"
        );
        Ok(rendered)
    }

    // ---- internals ----

    /// Resolve a reference to a live account, always against the store.
    /// Mutations never trust a cached snapshot.
    async fn resolve(&self, account_ref: &AccountRef) -> Result<Account, LedgerError> {
        let found = match account_ref {
            AccountRef::Id(id) => self.store.account_by_id(*id).await?,
            AccountRef::Number(number) => self.store.account_by_number(number).await?,
        };
        found.ok_or(LedgerError::AccountNotFound)
    }

    fn require_positive(amount: Money) -> Result<(), LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {amount}"
            )));
        }
        Ok(())
    }

    fn require_range(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<DateRange, LedgerError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(LedgerError::InvalidDateRange);
            }
        }
        Ok(DateRange { from, to })
    }

    fn credit(balance: Money, amount: Money) -> Result<Money, LedgerError> {
        balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidAmount("amount overflows the balance range".into()))
    }

    fn debit(balance: Money, amount: Money) -> Result<Money, LedgerError> {
        balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InvalidAmount("amount overflows the balance range".into()))
    }

    fn record(
        account: &Account,
        kind: TransactionKind,
        amount: Money,
        description: &str,
        counterparty: Option<AccountNumber>,
        balance_after: Money,
    ) -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            account_id: account.id,
            kind,
            amount,
            timestamp: Utc::now(),
            description: description.to_string(),
            counterparty,
            status: TransactionStatus::Success,
            balance_after,
        }
    }

    fn entry(account: &Account, new_balance: Money, record: TransactionRecord) -> LedgerEntry {
        LedgerEntry {
            account_id: account.id,
            expected_balance: account.balance,
            new_balance,
            record,
        }
    }

    async fn write_snapshot(&self, account: &Account) {
        self.cache_write(
            &keys::account_snapshot(account.id),
            account,
            self.config.snapshot_ttl,
        )
        .await;
        self.cache_write(
            &keys::account_snapshot_by_number(&account.number),
            account,
            self.config.snapshot_ttl,
        )
        .await;
    }

    async fn drop_snapshot(&self, account: &Account) {
        for key in [
            keys::account_snapshot(account.id),
            keys::account_snapshot_by_number(&account.number),
        ] {
            if let Err(e) = self.cache.delete(&key).await {
                warn!(%key, error = %e, "cache delete failed");
            }
        }
    }

    /// Eager invalidation after a balance mutation: both snapshot keys,
    /// every history page and every export artifact of the account.
    async fn invalidate_account(&self, account: &Account) {
        self.drop_snapshot(account).await;
        for prefix in [
            keys::history_prefix(account.id),
            keys::export_prefix(account.id),
        ] {
            if let Err(e) = self.cache.delete_prefix(&prefix).await {
                warn!(%prefix, error = %e, "cache prefix invalidation failed");
            }
        }
    }

    async fn cache_read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(%key, error = %e, "dropping undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%key, error = %e, "cache read failed; falling back to the store");
                None
            }
        }
    }

    async fn cache_write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(raw) => {
                if let Err(e) = self.cache.put(key, raw, ttl).await {
                    warn!(%key, error = %e, "cache write failed");
                }
            }
            Err(e) => warn!(%key, error = %e, "cache serialization failed"),
        }
    }
}
