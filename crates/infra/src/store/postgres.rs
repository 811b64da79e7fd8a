//! Postgres-backed system of record.
//!
//! Plain parameterized queries with explicit transactions. The optimistic
//! guard is an `UPDATE ... WHERE id = $1 AND balance = $2` whose row count
//! decides between commit and [`StoreError::Conflict`]; the `balance >= 0`
//! check constraint backs the domain invariant at the storage level.
//!
//! ## Error mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation, number index) | `23505` | `DuplicateAccountNumber` |
//! | Database (unique violation, other) | `23505` | `Conflict` |
//! | Database (other) | any | `Unavailable` |
//! | Pool/network/decoding | n/a | `Unavailable` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::debug;

use corebank_core::{
    Account, AccountId, AccountNumber, AccountType, Currency, DomainError, Money, OwnerId,
    TransactionId, TransactionRecord,
};
use corebank_ledger::{DateRange, LedgerEntry, LedgerStore, StoreError};

/// Postgres store over the `accounts` and `transactions` tables
/// (schema under `migrations/`).
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                if db_err.constraint().is_some_and(|c| c.contains("number")) {
                    return StoreError::DuplicateAccountNumber;
                }
                return StoreError::Conflict;
            }
            StoreError::Unavailable(format!(
                "database error in {operation}: {}",
                db_err.message()
            ))
        }
        other => StoreError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}

fn try_column<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::Unavailable(format!("failed to read column {name}: {e}")))
}

fn bad_row(e: DomainError) -> StoreError {
    StoreError::Unavailable(format!("stored row fails domain validation: {e}"))
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Result<Account, StoreError> {
    let id: uuid::Uuid = try_column(row, "id")?;
    let owner_id: uuid::Uuid = try_column(row, "owner_id")?;
    let number: String = try_column(row, "number")?;
    let account_type: String = try_column(row, "account_type")?;
    let currency: String = try_column(row, "currency")?;
    let balance: Decimal = try_column(row, "balance")?;
    let created_at: DateTime<Utc> = try_column(row, "created_at")?;

    Ok(Account {
        id: AccountId::from_uuid(id),
        owner_id: OwnerId::from_uuid(owner_id),
        number: AccountNumber::new(number).map_err(bad_row)?,
        account_type: account_type.parse().map_err(bad_row)?,
        currency: Currency::new(currency).map_err(bad_row)?,
        balance: Money::new(balance),
        created_at,
    })
}

fn transaction_from_row(row: &sqlx::postgres::PgRow) -> Result<TransactionRecord, StoreError> {
    let id: uuid::Uuid = try_column(row, "id")?;
    let account_id: uuid::Uuid = try_column(row, "account_id")?;
    let kind: String = try_column(row, "kind")?;
    let amount: Decimal = try_column(row, "amount")?;
    let occurred_at: DateTime<Utc> = try_column(row, "occurred_at")?;
    let description: String = try_column(row, "description")?;
    let counterparty: Option<String> = try_column(row, "counterparty")?;
    let status: String = try_column(row, "status")?;
    let balance_after: Decimal = try_column(row, "balance_after")?;

    Ok(TransactionRecord {
        id: TransactionId::from_uuid(id),
        account_id: AccountId::from_uuid(account_id),
        kind: kind.parse().map_err(bad_row)?,
        amount: Money::new(amount),
        timestamp: occurred_at,
        description,
        counterparty: counterparty
            .map(AccountNumber::new)
            .transpose()
            .map_err(bad_row)?,
        status: status.parse().map_err(bad_row)?,
        balance_after: Money::new(balance_after),
    })
}

/// Apply one guarded balance write plus its record append inside `tx`.
async fn apply_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: &LedgerEntry,
) -> Result<(), StoreError> {
    let updated = sqlx::query("UPDATE accounts SET balance = $3 WHERE id = $1 AND balance = $2")
        .bind(entry.account_id.as_uuid())
        .bind(entry.expected_balance.amount())
        .bind(entry.new_balance.amount())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("guarded_balance_update", e))?;

    if updated.rows_affected() != 1 {
        return Err(StoreError::Conflict);
    }

    let record = &entry.record;
    sqlx::query(
        r#"
        INSERT INTO transactions
            (id, account_id, kind, amount, occurred_at, description, counterparty, status, balance_after)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(record.id.as_uuid())
    .bind(record.account_id.as_uuid())
    .bind(record.kind.as_str())
    .bind(record.amount.amount())
    .bind(record.timestamp)
    .bind(record.description.as_str())
    .bind(record.counterparty.as_ref().map(|n| n.as_str()))
    .bind(record.status.as_str())
    .bind(record.balance_after.amount())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_transaction", e))?;

    Ok(())
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, owner_id, number, account_type, currency, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(account.owner_id.as_uuid())
        .bind(account.number.as_str())
        .bind(account.account_type.as_str())
        .bind(account.currency.as_str())
        .bind(account.balance.amount())
        .bind(account.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_account", e))?;
        Ok(())
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, number, account_type, currency, balance, created_at \
             FROM accounts WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("account_by_id", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn account_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            "SELECT id, owner_id, number, account_type, currency, balance, created_at \
             FROM accounts WHERE number = $1",
        )
        .bind(number.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("account_by_number", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn accounts_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, owner_id, number, account_type, currency, balance, created_at \
             FROM accounts WHERE owner_id = $1 ORDER BY created_at",
        )
        .bind(owner_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("accounts_by_owner", e))?;

        rows.iter().map(account_from_row).collect()
    }

    async fn update_metadata(
        &self,
        id: AccountId,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts SET account_type = $2, currency = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(account_type.as_str())
            .bind(currency.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_metadata", e))?;
        Ok(())
    }

    async fn commit_entry(&self, entry: LedgerEntry) -> Result<TransactionRecord, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;
        apply_entry(&mut tx, &entry).await?;
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        debug!(record_id = %entry.record.id, account_id = %entry.account_id, "ledger entry committed");
        Ok(entry.record)
    }

    async fn commit_transfer(
        &self,
        debit: LedgerEntry,
        credit: LedgerEntry,
    ) -> Result<(TransactionRecord, TransactionRecord), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin", e))?;

        // Stable lock order across concurrent transfers.
        if debit.account_id <= credit.account_id {
            apply_entry(&mut tx, &debit).await?;
            apply_entry(&mut tx, &credit).await?;
        } else {
            apply_entry(&mut tx, &credit).await?;
            apply_entry(&mut tx, &debit).await?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        debug!(
            debit_account = %debit.account_id,
            credit_account = %credit.account_id,
            "transfer committed"
        );
        Ok((debit.record, credit.record))
    }

    async fn transactions_page(
        &self,
        account_id: AccountId,
        range: DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError> {
        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM transactions
            WHERE account_id = $1
                AND ($2::timestamptz IS NULL OR occurred_at >= $2)
                AND ($3::timestamptz IS NULL OR occurred_at <= $3)
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(range.from)
        .bind(range.to)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_transactions", e))?;

        let total: i64 = try_column(&count_row, "total")?;

        let rows = sqlx::query(
            r#"
            SELECT id, account_id, kind, amount, occurred_at, description, counterparty, status, balance_after
            FROM transactions
            WHERE account_id = $1
                AND ($2::timestamptz IS NULL OR occurred_at >= $2)
                AND ($3::timestamptz IS NULL OR occurred_at <= $3)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(range.from)
        .bind(range.to)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("page_transactions", e))?;

        let items = rows
            .iter()
            .map(transaction_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total as u64))
    }

    async fn transactions_in_range(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, kind, amount, occurred_at, description, counterparty, status, balance_after
            FROM transactions
            WHERE account_id = $1
                AND ($2::timestamptz IS NULL OR occurred_at >= $2)
                AND ($3::timestamptz IS NULL OR occurred_at <= $3)
            ORDER BY occurred_at DESC, id DESC
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("range_transactions", e))?;

        rows.iter().map(transaction_from_row).collect()
    }
}
