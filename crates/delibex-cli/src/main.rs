//! delibex - batch generator for land-deliberation certificate extracts.
//!
//! Two commands: `generate` runs a full batch (four spreadsheets, two
//! templates, one output tree plus archive) and `template` scaffolds demo
//! templates to start from.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use delibex_pipeline::{
    run_batch, write_demo_templates, BatchConfig, Category, CategoryReport, GenerationReport,
    DEFAULT_ARCHIVE_NAME,
};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(
    name = "delibex",
    version,
    about = "Génération d'extraits de délibération foncière (individuels et collectifs)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one certificate per record and package the results
    Generate(GenerateArgs),
    /// Write demo templates to start from
    Template(TemplateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Input directory holding the spreadsheets and templates
    #[arg(short, long, default_value = "input")]
    input: PathBuf,

    /// Output directory for generated certificates
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Individual deliberations spreadsheet (default: INPUT/INDIV.xlsx)
    #[arg(long)]
    indiv: Option<PathBuf>,

    /// Collective deliberations spreadsheet (default: INPUT/COLL.xlsx)
    #[arg(long)]
    coll: Option<PathBuf>,

    /// Individual parcel coordinates (default: INPUT/COORDS_PI.xlsx)
    #[arg(long)]
    coords_pi: Option<PathBuf>,

    /// Collective parcel coordinates (default: INPUT/COORDS_PC.xlsx)
    #[arg(long)]
    coords_pc: Option<PathBuf>,

    /// Individual certificate template (default: INPUT/Template_Indiv.docx)
    #[arg(long)]
    template_indiv: Option<PathBuf>,

    /// Collective certificate template (default: INPUT/Template_Coll.docx)
    #[arg(long)]
    template_coll: Option<PathBuf>,

    /// Name of the result archive, created inside the output directory
    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    archive: String,

    /// Skip archive packaging
    #[arg(long)]
    no_archive: bool,

    /// Write the run report to a JSON file
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Suppress progress bars and the summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct TemplateArgs {
    /// Directory the demo templates are written to
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match Cli::parse().command {
        Commands::Generate(args) => generate(args),
        Commands::Template(args) => template(args),
    }
}

fn build_config(args: &GenerateArgs) -> BatchConfig {
    let mut config = BatchConfig::from_input_dir(&args.input, &args.output);
    if let Some(path) = &args.indiv {
        config.indiv_records = path.clone();
    }
    if let Some(path) = &args.coll {
        config.coll_records = path.clone();
    }
    if let Some(path) = &args.coords_pi {
        config.indiv_coords = path.clone();
    }
    if let Some(path) = &args.coords_pc {
        config.coll_coords = path.clone();
    }
    if let Some(path) = &args.template_indiv {
        config.template_indiv = path.clone();
    }
    if let Some(path) = &args.template_coll {
        config.template_coll = path.clone();
    }
    config.archive_name = if args.no_archive {
        None
    } else {
        Some(args.archive.clone())
    };
    config
}

fn category_bar(category: Category, total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg:>14} [{bar:40}] {pos}/{len}")
            .expect("valid progress template")
            .progress_chars("=> "),
    );
    bar.set_message(category.label());
    bar
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = build_config(&args);
    let quiet = args.quiet;

    let mut active: Option<(Category, ProgressBar)> = None;
    let report = run_batch(&config, |category, done, total| {
        if quiet {
            return;
        }
        let needs_new = !matches!(&active, Some((current, _)) if *current == category);
        if needs_new {
            if let Some((_, bar)) = active.take() {
                bar.finish();
            }
            active = Some((category, category_bar(category, total)));
        }
        if let Some((_, bar)) = &active {
            bar.set_position(done as u64);
        }
    })
    .context("la génération a échoué")?;
    if let Some((_, bar)) = active.take() {
        bar.finish();
    }

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
    }

    if !quiet {
        print_summary(&report);
    }
    Ok(())
}

fn print_category(label: &str, report: &CategoryReport) {
    let counts = format!("{}/{}", report.generated, report.attempted);
    if report.failures.is_empty() {
        println!("  {} {counts} extraits {label}", "✓".green());
    } else {
        println!(
            "  {} {counts} extraits {label} ({} en échec)",
            "!".yellow(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!("      {} {} : {}", "✗".red(), failure.id.bold(), failure.message);
        }
    }
}

fn print_summary(report: &GenerationReport) {
    println!("{}", "Génération terminée".bold());
    print_category("individuels", &report.individual);
    print_category("collectifs", &report.collective);
    if let Some(archive) = &report.archive {
        println!(
            "  {} archive {} ({} fichiers)",
            "✓".green(),
            archive.display(),
            report.archived_files
        );
    }
    println!(
        "{} documents générés sur {} enregistrements",
        report.generated().to_string().bold(),
        report.attempted()
    );
}

fn template(args: TemplateArgs) -> Result<()> {
    let written = write_demo_templates(&args.out)
        .with_context(|| format!("cannot write templates to {}", args.out.display()))?;
    for path in written {
        println!("{} {}", "✓".green(), path.display());
    }
    Ok(())
}
