//! Deliberation spreadsheet loader, built on calamine.
//!
//! Each input workbook carries one worksheet of interest (the first): a
//! header row of column names followed by one record per row. Cells keep
//! their spreadsheet types so identifier normalization can distinguish the
//! numeric `123.0` from the text `"123"` later on.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use delibex_core::{Dataset, DelibexError, FieldValue, Record, Result};
use log::debug;

fn cell_to_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty => FieldValue::Empty,
        Data::String(s) => FieldValue::Text(s.clone()),
        Data::Float(f) => FieldValue::Number(*f),
        Data::Int(i) => FieldValue::Number(*i as f64),
        Data::Bool(b) => FieldValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or(FieldValue::Number(dt.as_f64()), FieldValue::DateTime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => FieldValue::Text(s.clone()),
        // Formula errors (#DIV/0!, #N/A, ...) are treated as missing cells.
        Data::Error(_) => FieldValue::Empty,
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => cell_to_value(other).to_display().trim().to_string(),
    }
}

/// Load the first worksheet of a workbook as a dataset.
///
/// The first row is the header; empty header cells end up as empty column
/// names and are simply never matched by a field lookup.
///
/// # Errors
/// Returns a dataset error if the file cannot be opened as a workbook or
/// has no worksheet — a fatal condition for a batch run.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| DelibexError::Dataset(format!("cannot open {}: {e}", path.display())))?;

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(DelibexError::Dataset(format!(
            "{} has no worksheets",
            path.display()
        )));
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| DelibexError::Dataset(format!("cannot read {}: {e}", path.display())))?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(header_name).collect())
        .unwrap_or_default();

    let records: Vec<Record> = rows
        .map(|row| {
            Record::new(
                columns
                    .iter()
                    .zip(row.iter())
                    .map(|(name, cell)| (name.clone(), cell_to_value(cell)))
                    .collect(),
            )
        })
        .collect();

    debug!(
        "loaded {}: {} records, {} columns",
        path.display(),
        records.len(),
        columns.len()
    );

    Ok(Dataset::from_rows(columns, records))
}
