//! In-memory system of record for tests and development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use corebank_core::{
    Account, AccountId, AccountNumber, AccountType, Currency, OwnerId, TransactionRecord,
};
use corebank_ledger::{DateRange, LedgerEntry, LedgerStore, StoreError};

/// Mutex-guarded store with the same commit semantics as the Postgres
/// backend: expected-balance guard, all-or-nothing transfers.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<AccountId, Account>,
    transactions: Vec<TransactionRecord>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records for an account, oldest first (test helper).
    pub fn records_for(&self, account_id: AccountId) -> Vec<TransactionRecord> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<_> = inner
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        records
    }
}

fn in_range(record: &TransactionRecord, range: &DateRange) -> bool {
    range.from.is_none_or(|from| record.timestamp >= from)
        && range.to.is_none_or(|to| record.timestamp <= to)
}

fn check_guard(inner: &Inner, entry: &LedgerEntry) -> Result<(), StoreError> {
    let account = inner
        .accounts
        .get(&entry.account_id)
        .ok_or(StoreError::Conflict)?;
    if account.balance != entry.expected_balance {
        return Err(StoreError::Conflict);
    }
    Ok(())
}

fn apply_entry(inner: &mut Inner, entry: &LedgerEntry) {
    if let Some(account) = inner.accounts.get_mut(&entry.account_id) {
        account.balance = entry.new_balance;
    }
    inner.transactions.push(entry.record.clone());
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.values().any(|a| a.number == account.number) {
            return Err(StoreError::DuplicateAccountNumber);
        }
        inner.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .values()
            .find(|a| &a.number == number)
            .cloned())
    }

    async fn accounts_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .accounts
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_metadata(
        &self,
        id: AccountId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(account) = inner.accounts.get_mut(&id) {
            account.account_type = account_type;
            account.currency = currency;
        }
        Ok(())
    }

    async fn commit_entry(&self, entry: LedgerEntry) -> Result<TransactionRecord, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        check_guard(&inner, &entry)?;
        apply_entry(&mut inner, &entry);
        Ok(entry.record)
    }

    async fn commit_transfer(
        &self,
        debit: LedgerEntry,
        credit: LedgerEntry,
    ) -> Result<(TransactionRecord, TransactionRecord), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        // validate both guards before touching anything
        check_guard(&inner, &debit)?;
        check_guard(&inner, &credit)?;
        apply_entry(&mut inner, &debit);
        apply_entry(&mut inner, &credit);
        Ok((debit.record, credit.record))
    }

    async fn transactions_page(
        &self,
        account_id: AccountId,
        range: DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut matching: Vec<_> = inner
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id && in_range(t, &range))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn transactions_in_range(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut matching: Vec<_> = inner
            .transactions
            .iter()
            .filter(|t| t.account_id == account_id && in_range(t, &range))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(matching)
    }
}
