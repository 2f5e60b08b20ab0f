//! Placeholder token tables.
//!
//! Templates mark insertion points with guillemet-wrapped column names
//! (`«Nom»`, `«superficie»`). Each certificate category recognizes a fixed
//! token set; the value for a token comes from the record column of the
//! same name, except for the identifier, which is always the normalized
//! key, and the collective piece number, which reads a differently named
//! column.

use delibex_core::Record;

/// A resolved substitution table: token literal to replacement text.
pub type Replacements = Vec<(String, String)>;

/// Wrap a column name in guillemets, forming the token literal.
#[must_use]
pub fn token(column: &str) -> String {
    format!("«{column}»")
}

/// (token column, record column) pairs for individual certificates.
const INDIVIDUAL_FIELDS: [(&str, &str); 9] = [
    ("Prenom", "Prenom"),
    ("Nom", "Nom"),
    ("superficie", "superficie"),
    ("Village", "Village"),
    ("type_usag", "type_usag"),
    ("Num_piece", "Num_piece"),
    ("Type_piece", "Type_piece"),
    ("Date_naissance", "Date_naissance"),
    ("Telephone", "Telephone"),
];

/// (token column, record column) pairs for collective certificates. The
/// `«Num_piece»` token reads the `Numero_piece` column.
const COLLECTIVE_FIELDS: [(&str, &str); 4] = [
    ("superficie", "superficie"),
    ("Village", "Village"),
    ("type_usa", "type_usa"),
    ("Num_piece", "Numero_piece"),
];

fn build(fields: &[(&str, &str)], record: &Record, id: &str) -> Replacements {
    let mut replacements = Vec::with_capacity(fields.len() + 1);
    replacements.push((token("nicad"), id.to_string()));
    for (token_column, record_column) in fields {
        replacements.push((token(token_column), record.value(record_column).to_display()));
    }
    replacements
}

/// Substitution table for one individual record.
#[must_use]
pub fn individual_replacements(record: &Record, id: &str) -> Replacements {
    build(&INDIVIDUAL_FIELDS, record, id)
}

/// Substitution table for one collective record.
#[must_use]
pub fn collective_replacements(record: &Record, id: &str) -> Replacements {
    build(&COLLECTIVE_FIELDS, record, id)
}
