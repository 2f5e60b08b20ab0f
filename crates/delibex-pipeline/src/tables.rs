//! Table builders: the coordinate grid and the beneficiary roster.
//!
//! Both builders rebuild an existing template table in place. The
//! coordinate grid adapts its horizontal layout to the point count by
//! repeating a three-column block (label, X, Y) so that parcels with many
//! vertices still fit one page; the roster keeps the template's header row
//! and appends one row per beneficiary.

use delibex_core::units::cm_to_twips;
use delibex_core::{Alignment, Beneficiary, CoordinatePoint, DocxDocument, RunFont, TableRow};

use crate::CERT_FONT;

/// Columns per coordinate block: point label, X, Y.
const COLS_PER_BLOCK: usize = 3;

/// Point counts at which another block of columns is added.
const ONE_BLOCK_MAX: usize = 15;
const TWO_BLOCK_MAX: usize = 30;

const HEADER_FONT_SIZE: f64 = 8.0;
const POINT_FONT_SIZE: f64 = 7.5;
const ROSTER_FONT_SIZE: f64 = 9.0;

/// Width of columns added beyond the template grid.
const ADDED_COLUMN_CM: f64 = 1.5;

fn bold_cell_font(size: f64) -> RunFont {
    RunFont {
        name: Some(CERT_FONT.to_string()),
        size: Some(size),
        bold: Some(true),
        underline: None,
    }
}

/// Number of column blocks for a point count.
#[must_use]
pub const fn block_count(points: usize) -> usize {
    if points <= ONE_BLOCK_MAX {
        1
    } else if points <= TWO_BLOCK_MAX {
        2
    } else {
        3
    }
}

/// Rebuild the coordinate grid at `table_index` from the given points.
///
/// With no points, or no table at that index, the document is left
/// untouched: a parcel without surveyed geometry keeps the template's
/// prebuilt table rather than an empty shell.
///
/// Points are laid out column-block-major: block `b`, row `r` holds point
/// `r + b * rows_needed`, so the first block carries the first run of
/// labels top to bottom, the second block continues the sequence, and only
/// the last block may have blank tail cells.
pub fn fill_coordinate_table(
    doc: &mut DocxDocument,
    table_index: usize,
    points: &[CoordinatePoint],
) {
    if points.is_empty() {
        return;
    }
    let Some(table) = doc.table_mut(table_index) else {
        return;
    };

    table.rows.clear();

    let blocks = block_count(points.len());
    let total_cols = blocks * COLS_PER_BLOCK;
    table.extend_columns(total_cols, cm_to_twips(ADDED_COLUMN_CM));
    let row_width = table.columns();

    let mut header = TableRow::empty(row_width);
    for block in 0..blocks {
        let base = block * COLS_PER_BLOCK;
        header.cells[base].set_styled_text("PT", bold_cell_font(HEADER_FONT_SIZE), true);
        header.cells[base + 1].set_styled_text("X", bold_cell_font(HEADER_FONT_SIZE), true);
        header.cells[base + 2].set_styled_text("Y", bold_cell_font(HEADER_FONT_SIZE), true);
    }
    table.rows.push(header);

    let rows_needed = points.len().div_ceil(blocks);
    for r in 0..rows_needed {
        let mut row = TableRow::empty(row_width);
        for block in 0..blocks {
            let point_index = r + block * rows_needed;
            if let Some(point) = points.get(point_index) {
                let base = block * COLS_PER_BLOCK;
                row.cells[base].set_styled_text(&point.label, bold_cell_font(POINT_FONT_SIZE), true);
                row.cells[base + 1].set_styled_text(&point.x, bold_cell_font(POINT_FONT_SIZE), true);
                row.cells[base + 2].set_styled_text(&point.y, bold_cell_font(POINT_FONT_SIZE), true);
            }
        }
        table.rows.push(row);
    }

    table.bordered = true;
    table.alignment = Some(Alignment::Center);
}

/// Rebuild the beneficiary roster at `table_index`: keep the header row,
/// append one bold row per beneficiary. An empty list leaves a header-only
/// table. A missing table index leaves the document untouched.
pub fn fill_roster_table(
    doc: &mut DocxDocument,
    table_index: usize,
    beneficiaries: &[Beneficiary],
) {
    let Some(table) = doc.table_mut(table_index) else {
        return;
    };

    table.rows.truncate(1);
    let row_width = table.columns().max(COLS_PER_BLOCK);

    for beneficiary in beneficiaries {
        let mut row = TableRow::empty(row_width);
        row.cells[0].set_styled_text(
            &beneficiary.first_name,
            bold_cell_font(ROSTER_FONT_SIZE),
            false,
        );
        row.cells[1].set_styled_text(
            &beneficiary.last_name,
            bold_cell_font(ROSTER_FONT_SIZE),
            false,
        );
        row.cells[2].set_styled_text(
            &beneficiary.id_number,
            bold_cell_font(ROSTER_FONT_SIZE),
            false,
        );
        table.rows.push(row);
    }

    table.bordered = true;
}
