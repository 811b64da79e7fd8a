//! PDF statement rendering: a plain text table on A4 pages.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use corebank_ledger::{RenderError, Statement};

use super::{COLUMNS, row_cells};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 14.0;
const LINE_HEIGHT_MM: f32 = 6.0;
/// x offset of each of the five columns.
const COLUMN_X_MM: [f32; 5] = [14.0, 58.0, 112.0, 136.0, 172.0];

pub(super) fn render(statement: &Statement) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Account statement",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "statement",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text(
        format!("Statement for account {}", statement.account_number),
        14.0,
        Mm(MARGIN_MM),
        Mm(y),
        &bold,
    );
    y -= LINE_HEIGHT_MM * 1.5;
    layer.use_text(range_line(statement), 10.0, Mm(MARGIN_MM), Mm(y), &font);
    y -= LINE_HEIGHT_MM * 1.5;

    write_row(&layer, &bold, y, COLUMNS.map(str::to_string));
    y -= LINE_HEIGHT_MM;

    for line in &statement.lines {
        if y < MARGIN_MM {
            let (page, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "statement");
            layer = doc.get_page(page).get_layer(layer_index);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        write_row(&layer, &font, y, row_cells(statement, line));
        y -= LINE_HEIGHT_MM;
    }

    doc.save_to_bytes().map_err(|e| RenderError(e.to_string()))
}

fn write_row(
    layer: &printpdf::PdfLayerReference,
    font: &printpdf::IndirectFontRef,
    y: f32,
    cells: [String; 5],
) {
    for (x, cell) in COLUMN_X_MM.iter().zip(cells) {
        layer.use_text(cell, 9.0, Mm(*x), Mm(y), font);
    }
}

fn range_line(statement: &Statement) -> String {
    let from = statement
        .from
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "account opening".to_string());
    let to = statement
        .to
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "today".to_string());
    format!("Period: {from} to {to}")
}
