//! Statement export: model, formats and the renderer seam.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use corebank_core::{AccountNumber, Currency, DomainError, TransactionRecord};

/// Output formats a statement can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Pdf,
    Excel,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(DomainError::validation(format!(
                "format must be one of: csv, pdf, excel; got {other:?}"
            ))),
        }
    }
}

/// Everything a renderer needs to lay out one account statement.
#[derive(Debug, Clone)]
pub struct Statement {
    pub account_number: AccountNumber,
    pub currency: Currency,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Newest first, matching history pages.
    pub lines: Vec<TransactionRecord>,
}

/// A rendered statement ready to hand to the transport (and to cache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedStatement {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Rendering failure inside a [`StatementRenderer`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// Rendering seam. Implementations turn a statement into format bytes;
/// filename and content type stay with the core.
pub trait StatementRenderer: Send + Sync {
    fn render(&self, statement: &Statement, format: ExportFormat) -> Result<Vec<u8>, RenderError>;
}

/// Deterministic statement filename for an account + range + format.
pub fn file_name(statement: &Statement, format: ExportFormat) -> String {
    let from = statement
        .from
        .map(|t| t.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "start".to_string());
    let to = statement
        .to
        .map(|t| t.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "end".to_string());
    format!(
        "statement-{}-{from}-{to}.{}",
        statement.account_number,
        format.extension()
    )
}
