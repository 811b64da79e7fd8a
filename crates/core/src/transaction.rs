//! Transaction records: the durable balance history of an account.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountNumber;
use crate::error::DomainError;
use crate::id::{AccountId, TransactionId};
use crate::money::Money;

/// Classification of a ledger record.
///
/// Both legs of a transfer are `Transfer`-typed; the direction follows from
/// which account the record belongs to and its `balance_after` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::Transfer => "transfer",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "withdrawal" => Ok(Self::Withdrawal),
            "transfer" => Ok(Self::Transfer),
            other => Err(DomainError::validation(format!(
                "unknown transaction kind: {other:?}"
            ))),
        }
    }
}

/// Completion status. Normal completion only ever produces `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(DomainError::validation(format!(
                "unknown transaction status: {other:?}"
            ))),
        }
    }
}

/// Longest description persisted with a record; longer input is cut.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Clamp a free-text description to the persisted bound (on a char boundary).
pub fn clamp_description(input: &str) -> String {
    if input.len() <= MAX_DESCRIPTION_LEN {
        return input.to_string();
    }
    let mut end = MAX_DESCRIPTION_LEN;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    input[..end].to_string()
}

/// One immutable ledger record.
///
/// `amount` is always a positive magnitude. `balance_after` snapshots the
/// owning account's balance immediately after this record was applied, which
/// makes every account history independently replayable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    /// The other account of a transfer, by public number. `None` for plain
    /// deposits and withdrawals.
    pub counterparty: Option<AccountNumber>,
    pub status: TransactionStatus,
    pub balance_after: Money,
}
