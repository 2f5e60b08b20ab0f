//! Beneficiary list parsing.
//!
//! A collective record stores its beneficiaries as three newline-delimited
//! multi-valued cells (first names, last names, identity-document numbers).
//! The lists are aligned positionally: line *i* of each cell describes
//! beneficiary *i*. The data producer guarantees that alignment; nothing
//! here can detect a spreadsheet where the name and document lists are out
//! of step, so misalignment passes through as-is.

use delibex_core::{Beneficiary, FieldValue, Record};

const FIRST_NAME_COLUMN: &str = "Prenom";
const LAST_NAME_COLUMN: &str = "Nom";

/// Identity-document column names, first one present wins.
const PIECE_COLUMNS: [&str; 2] = ["Numero_piece", "Num_piece"];

fn split_lines(value: &FieldValue) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.to_display().split('\n').map(String::from).collect()
}

/// Parse the beneficiaries of one collective record.
///
/// The three lists are padded to the same length, zipped positionally and
/// trimmed per field; an entry is kept only if it still has a first or last
/// name (a trailing document number with no name is dropped).
#[must_use]
pub fn parse_beneficiaries(record: &Record) -> Vec<Beneficiary> {
    let first_names = split_lines(record.value(FIRST_NAME_COLUMN));
    let last_names = split_lines(record.value(LAST_NAME_COLUMN));
    let pieces = PIECE_COLUMNS
        .iter()
        .find_map(|col| record.get(col))
        .map(split_lines)
        .unwrap_or_default();

    let count = first_names.len().max(last_names.len()).max(pieces.len());

    let field = |list: &[String], i: usize| -> String {
        list.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
    };

    let mut beneficiaries = Vec::new();
    for i in 0..count {
        let first_name = field(&first_names, i);
        let last_name = field(&last_names, i);
        let id_number = field(&pieces, i);
        if !first_name.is_empty() || !last_name.is_empty() {
            beneficiaries.push(Beneficiary {
                first_name,
                last_name,
                id_number,
            });
        }
    }
    beneficiaries
}
