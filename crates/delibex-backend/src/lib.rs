//! Format boundaries for delibex.
//!
//! Everything binary lives here: the DOCX package container and its
//! WordprocessingML reader/writer, the XLSX dataset loader, and output
//! archive packaging. The rest of the system works on the in-memory types
//! from `delibex-core` and never touches a ZIP or an XML event.

pub mod archive;
pub mod package;
pub mod reader;
pub mod settings;
pub mod writer;
pub mod xlsx;

pub use archive::pack_directory;
pub use package::DocxPackage;
pub use xlsx::load_dataset;
