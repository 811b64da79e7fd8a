use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use corebank_core::{AccountType, Currency, OwnerId};

use crate::app::routes::common::parse_account_ref;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_account))
        .route("/:account_ref", get(get_account).put(update_account))
}

pub async fn create_account(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateAccountRequest>,
) -> axum::response::Response {
    let account_type: AccountType = match body.account_type.parse() {
        Ok(account_type) => account_type,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_account_type", format!("{e}"));
        }
    };
    let currency = match body.currency {
        Some(raw) => match Currency::new(&raw) {
            Ok(currency) => currency,
            Err(e) => {
                return errors::json_error(StatusCode::BAD_REQUEST, "invalid_currency", format!("{e}"));
            }
        },
        None => Currency::default(),
    };

    match services
        .create_account(OwnerId::from_uuid(body.owner_id), account_type, currency)
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn get_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_ref): Path<String>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&account_ref) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    match services.account(&account_ref).await {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn update_account(
    Extension(services): Extension<Arc<AppServices>>,
    Path(account_ref): Path<String>,
    Json(body): Json<dto::UpdateAccountRequest>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&account_ref) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    let account_type = match body.account_type.as_deref().map(str::parse::<AccountType>) {
        Some(Ok(account_type)) => Some(account_type),
        Some(Err(e)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_account_type", format!("{e}"));
        }
        None => None,
    };
    let currency = match body.currency.as_deref().map(Currency::new) {
        Some(Ok(currency)) => Some(currency),
        Some(Err(e)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_currency", format!("{e}"));
        }
        None => None,
    };

    match services
        .update_account(&account_ref, account_type, currency)
        .await
    {
        Ok(account) => (StatusCode::OK, Json(dto::account_to_json(&account))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
