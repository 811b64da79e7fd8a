//! Ledger configuration, env-driven with safe defaults.

use std::time::Duration;

use rust_decimal::Decimal;

use corebank_core::Money;

/// Tunables for the ledger core.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Per-transfer ceiling; transfers above this are rejected as invalid.
    pub max_transfer_amount: Money,
    /// Bounded retries when an optimistic commit loses a race.
    pub commit_retries: u32,
    pub snapshot_ttl: Duration,
    pub history_ttl: Duration,
    pub export_ttl: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            // 1,000,000.00
            max_transfer_amount: Money::new(Decimal::new(100_000_000, 2)),
            commit_retries: 5,
            snapshot_ttl: Duration::from_secs(600),
            history_ttl: Duration::from_secs(300),
            export_ttl: Duration::from_secs(600),
        }
    }
}

impl LedgerConfig {
    /// Defaults with overrides read from the environment.
    ///
    /// Recognizes `MAX_TRANSFER_AMOUNT` (decimal); anything unparseable is
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var("MAX_TRANSFER_AMOUNT") {
            match raw.parse::<Money>() {
                Ok(ceiling) if ceiling.is_positive() => config.max_transfer_amount = ceiling,
                _ => tracing::warn!("ignoring invalid MAX_TRANSFER_AMOUNT={raw}"),
            }
        }
        config
    }
}
