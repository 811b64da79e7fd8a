//! Process-wide observability wiring.

mod tracing;

pub use crate::tracing::init;
