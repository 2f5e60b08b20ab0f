//! Batch orchestration.
//!
//! Loads the four datasets and two templates, then renders one certificate
//! per record: clone the template body, substitute the record's fields,
//! run the page-fit passes, rebuild the coordinate grid (and, for
//! collective parcels, the beneficiary roster), and save the package under
//! an identifier-derived name. A failure while rendering one record is
//! recorded and the batch moves on; only dataset or template loading
//! aborts the whole run. The outcome is a report of counts and per-record
//! failures, not a single pass/fail flag.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use delibex_backend::{load_dataset, pack_directory, DocxPackage};
use delibex_core::{normalize_id, Dataset, DocxDocument, Record, Result};
use log::{info, warn};
use serde::Serialize;

use crate::beneficiaries::parse_beneficiaries;
use crate::coords::{points_for, KEY_COLUMN};
use crate::layout::{apply_narrow_margins, shrink_legal_text, tighten_spacing};
use crate::substitute::apply_replacements;
use crate::tables::{fill_coordinate_table, fill_roster_table};
use crate::tokens::{collective_replacements, individual_replacements, Replacements};

/// Default name of the output archive, created inside the output directory.
pub const DEFAULT_ARCHIVE_NAME: &str = "Resultats_Extraits.zip";

/// Certificate category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Individual,
    Collective,
}

impl Category {
    /// Output subdirectory for the category.
    #[must_use]
    pub const fn subdir(self) -> &'static str {
        match self {
            Self::Individual => "Individuelles",
            Self::Collective => "Collectives",
        }
    }

    /// Output file name prefix.
    #[must_use]
    pub const fn file_prefix(self) -> &'static str {
        match self {
            Self::Individual => "Extrait_PI_",
            Self::Collective => "Extrait_PC_",
        }
    }

    /// Human-readable label used in logs and summaries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "individuelles",
            Self::Collective => "collectives",
        }
    }
}

/// All inputs and outputs of a batch run, passed in explicitly so tests can
/// point the orchestrator at temporary directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub indiv_records: PathBuf,
    pub coll_records: PathBuf,
    pub indiv_coords: PathBuf,
    pub coll_coords: PathBuf,
    pub template_indiv: PathBuf,
    pub template_coll: PathBuf,
    pub output_dir: PathBuf,
    /// Archive file name, created inside `output_dir`; `None` skips packaging.
    pub archive_name: Option<String>,
}

impl BatchConfig {
    /// Conventional layout: all inputs under one directory, default names.
    #[must_use]
    pub fn from_input_dir(input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            indiv_records: input_dir.join("INDIV.xlsx"),
            coll_records: input_dir.join("COLL.xlsx"),
            indiv_coords: input_dir.join("COORDS_PI.xlsx"),
            coll_coords: input_dir.join("COORDS_PC.xlsx"),
            template_indiv: input_dir.join(crate::scaffold::TEMPLATE_INDIV),
            template_coll: input_dir.join(crate::scaffold::TEMPLATE_COLL),
            output_dir: output_dir.to_path_buf(),
            archive_name: Some(DEFAULT_ARCHIVE_NAME.to_string()),
        }
    }
}

/// One failed record: identifier plus the error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
    pub id: String,
    pub message: String,
}

/// Outcome of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub attempted: usize,
    pub generated: usize,
    pub failures: Vec<RecordFailure>,
}

/// Outcome of a whole batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub individual: CategoryReport,
    pub collective: CategoryReport,
    /// Path of the output archive, when packaging was requested.
    pub archive: Option<PathBuf>,
    /// Number of files packed into the archive.
    pub archived_files: usize,
}

impl GenerationReport {
    /// Total documents generated across both categories.
    #[must_use]
    pub const fn generated(&self) -> usize {
        self.individual.generated + self.collective.generated
    }

    /// Total records attempted across both categories.
    #[must_use]
    pub const fn attempted(&self) -> usize {
        self.individual.attempted + self.collective.attempted
    }
}

/// A loaded template: the package for saving, the parsed body for cloning.
struct Template {
    package: DocxPackage,
    document: DocxDocument,
}

impl Template {
    /// Open a template and drop any residual mail-merge data connection it
    /// carries; every clone made from it is then already clean.
    fn load(path: &Path) -> Result<Self> {
        let mut package = DocxPackage::open(path)?;
        package.strip_data_connections()?;
        let document = package.document()?;
        Ok(Self { package, document })
    }
}

fn load_keyed_dataset(path: &Path) -> Result<Dataset> {
    let mut dataset = load_dataset(path)?;
    dataset.normalize_key_column(KEY_COLUMN);
    Ok(dataset)
}

/// Distinct normalized identifiers of a dataset.
fn id_set(dataset: &Dataset) -> HashSet<String> {
    dataset
        .rows()
        .iter()
        .map(|row| normalize_id(row.value(KEY_COLUMN)))
        .collect()
}

fn log_match_diagnostic(label: &str, records: &Dataset, coords: &Dataset) {
    let record_ids = id_set(records);
    let coord_ids = id_set(coords);
    let matched = record_ids.intersection(&coord_ids).count();
    info!(
        "coordinate match ({label}): {matched}/{} records have geometry",
        record_ids.len()
    );
}

/// Render and save one certificate. Any error here fails only this record.
fn generate_record(
    template: &Template,
    record: &Record,
    id: &str,
    coords: &Dataset,
    category: Category,
    out_dir: &Path,
) -> Result<PathBuf> {
    let mut doc = template.document.clone();

    apply_narrow_margins(&mut doc);

    let replacements: Replacements = match category {
        Category::Individual => individual_replacements(record, id),
        Category::Collective => collective_replacements(record, id),
    };
    apply_replacements(&mut doc, &replacements)?;

    tighten_spacing(&mut doc);
    shrink_legal_text(&mut doc);

    let points = points_for(coords, id);
    match category {
        Category::Individual => fill_coordinate_table(&mut doc, 0, &points),
        Category::Collective => {
            let beneficiaries = parse_beneficiaries(record);
            fill_roster_table(&mut doc, 0, &beneficiaries);
            fill_coordinate_table(&mut doc, 1, &points);
        }
    }

    let path = out_dir.join(format!("{}{id}.docx", category.file_prefix()));
    let mut package = template.package.clone();
    package.set_document(&doc)?;
    package.save(&path)?;
    Ok(path)
}

fn generate_category(
    category: Category,
    records: &Dataset,
    coords: &Dataset,
    template: &Template,
    out_dir: &Path,
    on_progress: &mut dyn FnMut(Category, usize, usize),
) -> Result<CategoryReport> {
    std::fs::create_dir_all(out_dir)?;

    let total = records.len();
    let mut report = CategoryReport::default();

    for (index, record) in records.rows().iter().enumerate() {
        let id = normalize_id(record.value(KEY_COLUMN));
        report.attempted += 1;

        match generate_record(template, record, &id, coords, category, out_dir) {
            Ok(_) => {
                report.generated += 1;
                if report.generated % 50 == 0 {
                    info!("{}: {} generated", category.label(), report.generated);
                }
            }
            Err(e) => {
                warn!("{}: record {id} failed: {e}", category.label());
                report.failures.push(RecordFailure {
                    id,
                    message: e.to_string(),
                });
            }
        }

        on_progress(category, index + 1, total);
    }

    info!(
        "{}: {}/{} certificates generated",
        category.label(),
        report.generated,
        report.attempted
    );
    Ok(report)
}

/// Run a full batch: both categories, then the output archive.
///
/// `on_progress` is called after every record with the category and the
/// done/total counts, so a frontend can drive a progress display.
///
/// # Errors
/// Returns an error only for batch-fatal conditions: unreadable datasets or
/// templates, an unwritable output directory, or archive packaging failure.
/// Per-record failures are reported in the returned [`GenerationReport`].
pub fn run_batch(
    config: &BatchConfig,
    mut on_progress: impl FnMut(Category, usize, usize),
) -> Result<GenerationReport> {
    let indiv_records = load_keyed_dataset(&config.indiv_records)?;
    info!("{} délibérations individuelles", indiv_records.len());
    let coll_records = load_keyed_dataset(&config.coll_records)?;
    info!("{} délibérations collectives", coll_records.len());
    let indiv_coords = load_keyed_dataset(&config.indiv_coords)?;
    let coll_coords = load_keyed_dataset(&config.coll_coords)?;

    log_match_diagnostic("individuelles", &indiv_records, &indiv_coords);
    log_match_diagnostic("collectives", &coll_records, &coll_coords);

    let template_indiv = Template::load(&config.template_indiv)?;
    let template_coll = Template::load(&config.template_coll)?;

    let individual = generate_category(
        Category::Individual,
        &indiv_records,
        &indiv_coords,
        &template_indiv,
        &config.output_dir.join(Category::Individual.subdir()),
        &mut on_progress,
    )?;

    let collective = generate_category(
        Category::Collective,
        &coll_records,
        &coll_coords,
        &template_coll,
        &config.output_dir.join(Category::Collective.subdir()),
        &mut on_progress,
    )?;

    let (archive, archived_files) = match &config.archive_name {
        Some(name) => {
            let path = config.output_dir.join(name);
            let packed = pack_directory(&config.output_dir, &path)?;
            info!("archive {} ({packed} files)", path.display());
            (Some(path), packed)
        }
        None => (None, 0),
    };

    Ok(GenerationReport {
        individual,
        collective,
        archive,
        archived_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_naming() {
        assert_eq!(Category::Individual.subdir(), "Individuelles");
        assert_eq!(Category::Individual.file_prefix(), "Extrait_PI_");
        assert_eq!(Category::Collective.subdir(), "Collectives");
        assert_eq!(Category::Collective.file_prefix(), "Extrait_PC_");
    }

    #[test]
    fn test_config_from_input_dir() {
        let config = BatchConfig::from_input_dir(Path::new("/in"), Path::new("/out"));
        assert_eq!(config.indiv_records, Path::new("/in/INDIV.xlsx"));
        assert_eq!(config.coll_coords, Path::new("/in/COORDS_PC.xlsx"));
        assert_eq!(config.template_coll, Path::new("/in/Template_Coll.docx"));
        assert_eq!(config.archive_name.as_deref(), Some(DEFAULT_ARCHIVE_NAME));
    }

    #[test]
    fn test_report_totals() {
        let report = GenerationReport {
            individual: CategoryReport {
                attempted: 3,
                generated: 2,
                failures: vec![RecordFailure {
                    id: "9".to_string(),
                    message: "boom".to_string(),
                }],
            },
            collective: CategoryReport {
                attempted: 1,
                generated: 1,
                failures: Vec::new(),
            },
            archive: None,
            archived_files: 0,
        };
        assert_eq!(report.attempted(), 4);
        assert_eq!(report.generated(), 3);
    }
}
