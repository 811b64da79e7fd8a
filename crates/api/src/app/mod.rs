//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured as:
//! - `services.rs`: backend wiring (store/cache selection, ledger construction)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app() -> Router {
    let services = Arc::new(services::build_services().await);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
}
