//! Cache backends for the ledger's read-through tier.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
