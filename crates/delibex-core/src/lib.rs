//! Core types for delibex: the in-memory document model, measurement units,
//! spreadsheet record types, and the shared error type.
//!
//! This crate has no I/O. The backend crate moves these types across the
//! DOCX/XLSX format boundaries; the pipeline crate implements certificate
//! generation on top of them.

pub mod document;
pub mod error;
pub mod record;
pub mod units;

pub use document::{
    Alignment, Block, DocxDocument, LineSpacing, Paragraph, ParagraphFormat, Run, RunFont,
    SectionProps, Table, TableCell, TableRow,
};
pub use error::{DelibexError, Result};
pub use record::{normalize_id, Beneficiary, CoordinatePoint, Dataset, FieldValue, Record};
