use axum::http::StatusCode;

use corebank_core::AccountRef;

use crate::app::errors;

/// Parse the polymorphic account reference (uuid or 10-digit number) used
/// by every endpoint, mapping failures to a 400.
pub fn parse_account_ref(raw: &str) -> Result<AccountRef, axum::response::Response> {
    raw.parse::<AccountRef>().map_err(|e| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_account_ref", e.to_string())
    })
}
