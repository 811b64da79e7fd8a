//! Statement renderers behind the ledger's [`StatementRenderer`] seam.
//!
//! Every format lays out the same five columns the statement always had:
//! date, description, type, amount, balance.

mod csv;
mod pdf;
mod xlsx;

use corebank_core::TransactionRecord;
use corebank_ledger::{ExportFormat, RenderError, Statement, StatementRenderer};

pub(crate) const COLUMNS: [&str; 5] = ["Date", "Description", "Type", "Amount", "Balance"];

pub(crate) fn row_cells(statement: &Statement, line: &TransactionRecord) -> [String; 5] {
    [
        line.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        line.description.clone(),
        line.kind.as_str().to_string(),
        format!("{} {}", line.amount, statement.currency),
        format!("{} {}", line.balance_after, statement.currency),
    ]
}

/// Renders statements into every supported format.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl StatementRenderer for DocumentRenderer {
    fn render(&self, statement: &Statement, format: ExportFormat) -> Result<Vec<u8>, RenderError> {
        match format {
            ExportFormat::Csv => csv::render(statement),
            ExportFormat::Pdf => pdf::render(statement),
            ExportFormat::Excel => xlsx::render(statement),
        }
    }
}
