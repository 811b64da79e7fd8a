//! CSV statement rendering.

use corebank_ledger::{RenderError, Statement};

use super::{COLUMNS, row_cells};

pub(super) fn render(statement: &Statement) -> Result<Vec<u8>, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(COLUMNS)
        .map_err(|e| RenderError(e.to_string()))?;
    for line in &statement.lines {
        writer
            .write_record(row_cells(statement, line))
            .map_err(|e| RenderError(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| RenderError(e.to_string()))
}
