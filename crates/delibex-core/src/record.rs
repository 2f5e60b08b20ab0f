//! Record and dataset types for deliberation spreadsheets.
//!
//! A dataset is one loaded worksheet: a header row of column names and one
//! record per data row. Cell values keep their spreadsheet type until they
//! are rendered into a document, because the identifier join must see the
//! numeric/text distinction (`123.0` in one sheet, `"123"` in another).

use std::collections::HashMap;

use chrono::NaiveDateTime;

/// One spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Empty or missing cell.
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    /// True for an empty/missing cell. An empty *string* is a present value.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric view of the value, parsing numeric-looking text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render the value for insertion into a document.
    ///
    /// Empty cells render as the empty string, never as a textual null
    /// marker. Integral numbers drop the decimal point (spreadsheets store
    /// `123` as `123.0`); dates at midnight render as a plain `dd/mm/yyyy`.
    #[must_use]
    pub fn to_display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%d/%m/%Y").to_string()
                } else {
                    dt.format("%d/%m/%Y %H:%M").to_string()
                }
            }
        }
    }
}

/// Canonical string form of a record identifier.
///
/// Applied to every identifier column before any join: a record keyed
/// `123.0` in one spreadsheet must match coordinate rows keyed `"123"` in
/// another. Null becomes the empty string, integral numbers lose the
/// decimal point, everything else is its trimmed string form.
///
/// Idempotent: normalizing an already-normalized value returns it unchanged.
#[must_use]
pub fn normalize_id(value: &FieldValue) -> String {
    match value {
        FieldValue::Empty => String::new(),
        FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
            format!("{}", *n as i64)
        }
        FieldValue::Text(s) => s.trim().to_string(),
        other => other.to_display().trim().to_string(),
    }
}

/// One data row: field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    #[must_use]
    pub fn new(fields: HashMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    /// Look up a field by column name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a field, treating a missing column as an empty cell.
    #[must_use]
    pub fn value(&self, name: &str) -> &FieldValue {
        const EMPTY: &FieldValue = &FieldValue::Empty;
        self.fields.get(name).unwrap_or(EMPTY)
    }

    /// Replace a field value (used when canonicalizing key columns).
    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }
}

/// One loaded worksheet: header columns plus data records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    /// Build a dataset directly from rows; tests use this to run the
    /// pipeline against in-memory data without a spreadsheet on disk.
    #[must_use]
    pub fn from_rows(columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self { columns, rows }
    }

    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Canonicalize every value in the given key column with
    /// [`normalize_id`]. Every dataset that participates in a join gets
    /// this pass right after loading.
    pub fn normalize_key_column(&mut self, key: &str) {
        for row in &mut self.rows {
            let canonical = normalize_id(row.value(key));
            row.set(key, FieldValue::Text(canonical));
        }
    }
}

/// One geometry vertex of a parcel, already formatted for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CoordinatePoint {
    /// Sequential label: `P1`, `P2`, ...
    pub label: String,
    /// X coordinate, two decimals, empty when the source cell is null.
    pub x: String,
    /// Y coordinate, two decimals, empty when the source cell is null.
    pub y: String,
}

/// One beneficiary of a collective parcel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Beneficiary {
    pub first_name: String,
    pub last_name: String,
    /// Identity document number; may be empty.
    pub id_number: String,
}
