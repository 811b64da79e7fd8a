use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use corebank_core::{Account, TransactionRecord};
use corebank_ledger::HistoryPage;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub owner_id: uuid::Uuid,
    pub account_type: String,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub account_type: Option<String>,
    pub currency: Option<String>,
}

/// Shared body of deposit and withdraw: the account ref is either an
/// internal id or a 10-digit account number.
#[derive(Debug, Deserialize)]
pub struct MoveMoneyRequest {
    pub account: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_account: String,
    pub to_account_number: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub account: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub account: String,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub format: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn account_to_json(account: &Account) -> serde_json::Value {
    serde_json::json!({
        "id": account.id.to_string(),
        "owner_id": account.owner_id.to_string(),
        "account_number": account.number.to_string(),
        "account_type": account.account_type.as_str(),
        "currency": account.currency.as_str(),
        "balance": account.balance.to_string(),
        "created_at": account.created_at.to_rfc3339(),
    })
}

pub fn transaction_to_json(record: &TransactionRecord) -> serde_json::Value {
    serde_json::json!({
        "id": record.id.to_string(),
        "account_id": record.account_id.to_string(),
        "type": record.kind.as_str(),
        "amount": record.amount.to_string(),
        "timestamp": record.timestamp.to_rfc3339(),
        "description": record.description,
        "target_account_number": record.counterparty.as_ref().map(|n| n.to_string()),
        "status": record.status.as_str(),
        "balance_after_transaction": record.balance_after.to_string(),
    })
}

pub fn history_to_json(page: &HistoryPage) -> serde_json::Value {
    serde_json::json!({
        "page": page.page,
        "page_size": page.page_size,
        "total": page.total,
        "items": page.items.iter().map(transaction_to_json).collect::<Vec<_>>(),
    })
}
