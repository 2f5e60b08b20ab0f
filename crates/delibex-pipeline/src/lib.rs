//! Certificate generation pipeline.
//!
//! Turns land-deliberation records into per-parcel certificate documents:
//! placeholder substitution over a template body, coordinate grid and
//! beneficiary roster construction, page-fit layout passes, and the batch
//! orchestrator that runs the whole sequence per record and aggregates
//! per-record outcomes into a report.

pub mod batch;
pub mod beneficiaries;
pub mod coords;
pub mod layout;
pub mod scaffold;
pub mod substitute;
pub mod tables;
pub mod tokens;

/// Font family every generated run uses.
pub const CERT_FONT: &str = "Times New Roman";

pub use batch::{
    run_batch, BatchConfig, Category, CategoryReport, GenerationReport, RecordFailure,
    DEFAULT_ARCHIVE_NAME,
};
pub use beneficiaries::parse_beneficiaries;
pub use coords::points_for;
pub use scaffold::write_demo_templates;
pub use substitute::apply_replacements;
