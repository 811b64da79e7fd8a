//! History pagination model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use corebank_core::TransactionRecord;

/// Largest page a caller can request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A history request, before clamping.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    /// Page and size clamped into supported bounds. Shape validation is the
    /// transport's job; the core never errors on odd paging values.
    pub(crate) fn clamped(mut self) -> Self {
        if self.page == 0 {
            self.page = 1;
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.page_size = self.page_size.min(MAX_PAGE_SIZE);
        self
    }
}

/// One page of records, newest first, plus the total matching count.
///
/// An out-of-range page is a valid result: empty items, true total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub items: Vec<TransactionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_fixes_degenerate_paging() {
        let q = HistoryQuery {
            page: 0,
            page_size: 0,
            ..HistoryQuery::default()
        }
        .clamped();
        assert_eq!(q.page, 1);
        assert_eq!(q.page_size, DEFAULT_PAGE_SIZE);

        let q = HistoryQuery {
            page: 3,
            page_size: 10_000,
            ..HistoryQuery::default()
        }
        .clamped();
        assert_eq!(q.page, 3);
        assert_eq!(q.page_size, MAX_PAGE_SIZE);
    }
}
