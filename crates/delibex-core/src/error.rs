//! Error types for certificate generation.

use thiserror::Error;

/// Error types that can occur while loading datasets, reading or writing
/// document packages, or rendering a certificate.
///
/// Dataset and template errors raised while loading inputs are fatal for a
/// batch run; everything raised while rendering a single record is caught at
/// the orchestrator boundary and reported per record.
#[derive(Error, Debug)]
pub enum DelibexError {
    /// File I/O error (missing input, unwritable output path, disk full).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A spreadsheet could not be opened or does not have the expected shape.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// A template package could not be opened or its body could not be parsed.
    #[error("Template error: {0}")]
    Template(String),

    /// Failure while serializing a generated document back into its package.
    #[error("Render error: {0}")]
    Render(String),

    /// Failure while packaging generated documents into the output archive.
    #[error("Archive error: {0}")]
    Archive(String),
}

/// Type alias for [`Result<T, DelibexError>`].
pub type Result<T> = std::result::Result<T, DelibexError>;
