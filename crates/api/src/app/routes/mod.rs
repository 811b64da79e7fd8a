use axum::Router;

pub mod accounts;
pub mod common;
pub mod system;
pub mod transactions;

/// Router for all ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/transactions", transactions::router())
}
