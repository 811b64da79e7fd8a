use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use corebank_core::{AccountNumber, Money};
use corebank_ledger::{DEFAULT_PAGE_SIZE, ExportFormat, HistoryQuery};

use crate::app::routes::common::parse_account_ref;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/transfer", post(transfer))
        .route("/history", get(history))
        .route("/export", get(export))
}

pub async fn deposit(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MoveMoneyRequest>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&body.account) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    match services
        .deposit(&account_ref, Money::new(body.amount), body.description)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(dto::transaction_to_json(&record))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MoveMoneyRequest>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&body.account) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    match services
        .withdraw(&account_ref, Money::new(body.amount), body.description)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(dto::transaction_to_json(&record))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let source_ref = match parse_account_ref(&body.from_account) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    let destination = match body.to_account_number.parse::<AccountNumber>() {
        Ok(number) => number,
        Err(e) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_account_number",
                e.to_string(),
            );
        }
    };
    match services
        .transfer(&source_ref, &destination, Money::new(body.amount), body.description)
        .await
    {
        Ok(record) => (StatusCode::OK, Json(dto::transaction_to_json(&record))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn history(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::HistoryParams>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&params.account) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    let query = HistoryQuery {
        page: params.page.unwrap_or(1),
        page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        from: params.from,
        to: params.to,
    };
    match services.history(&account_ref, query).await {
        Ok(page) => (StatusCode::OK, Json(dto::history_to_json(&page))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn export(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ExportParams>,
) -> axum::response::Response {
    let account_ref = match parse_account_ref(&params.account) {
        Ok(account_ref) => account_ref,
        Err(resp) => return resp,
    };
    let format = match params.format.parse::<ExportFormat>() {
        Ok(format) => format,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_format", e.to_string());
        }
    };
    match services
        .export(&account_ref, params.from, params.to, format)
        .await
    {
        Ok(rendered) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, rendered.content_type.clone()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", rendered.file_name),
                ),
            ],
            rendered.bytes,
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
