use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use corebank_ledger::{LedgerError, StoreError};

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::AccountNotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "account not found")
        }
        LedgerError::InvalidAmount(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_amount", msg)
        }
        LedgerError::InsufficientBalance {
            available,
            requested,
        } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "insufficient_balance",
            format!("available {available}, requested {requested}"),
        ),
        LedgerError::SameAccountTransfer => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "same_account_transfer",
            "source and destination are the same account",
        ),
        LedgerError::DuplicateAccountType(account_type) => json_error(
            StatusCode::CONFLICT,
            "duplicate_account_type",
            format!("owner already holds a {} account", account_type.as_str()),
        ),
        LedgerError::InvalidDateRange => json_error(
            StatusCode::BAD_REQUEST,
            "invalid_date_range",
            "from must not be after to",
        ),
        LedgerError::NoData => json_error(
            StatusCode::NOT_FOUND,
            "no_data",
            "no matching transactions",
        ),
        LedgerError::ExportFailed(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "export_failed", msg)
        }
        LedgerError::Store(StoreError::Conflict) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "account is being modified concurrently; retry",
        ),
        LedgerError::Store(StoreError::DuplicateAccountNumber) => json_error(
            StatusCode::CONFLICT,
            "conflict",
            "account number collision; retry",
        ),
        LedgerError::Store(StoreError::Unavailable(msg)) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
