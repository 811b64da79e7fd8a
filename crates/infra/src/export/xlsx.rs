//! Excel statement rendering.

use rust_xlsxwriter::{Format, Workbook};

use corebank_ledger::{RenderError, Statement};

use super::{COLUMNS, row_cells};

pub(super) fn render(statement: &Statement) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Transactions")
        .map_err(|e| RenderError(e.to_string()))?;

    let header = Format::new().set_bold();
    for (col, title) in COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(|e| RenderError(e.to_string()))?;
    }

    for (row, line) in statement.lines.iter().enumerate() {
        let cells = row_cells(statement, line);
        for (col, cell) in cells.iter().enumerate() {
            worksheet
                .write_string((row + 1) as u32, col as u16, cell)
                .map_err(|e| RenderError(e.to_string()))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| RenderError(e.to_string()))
}
