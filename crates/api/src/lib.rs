//! `corebank-api` — HTTP transport for the corebank ledger.

pub mod app;
