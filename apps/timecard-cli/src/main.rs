//! timecard: extract attendance data from PDF reports, or regenerate a
//! report with varied times.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{builder::ArgAction, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use timecard_extract::{Backend, ExtractError};
use timecard_gen::VariationGenerator;
use timecard_pdf::{analyze_pdf, write_records, StructureModel};
use timecard_types::{AttendanceRecord, VariationLevel};

/// Directory searched when a bare input filename does not exist as given.
const INPUT_DIR: &str = "input";

/// Directory regenerated files land in when no output path is given.
const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(name = "timecard", version, about = "PDF attendance extraction and regeneration")]
struct Cli {
    /// Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract attendance records from a PDF and print them
    Extract {
        /// PDF to read (bare filenames are also looked up under input/)
        input: PathBuf,

        /// Force a specific extraction backend instead of the fallback order
        #[arg(long)]
        backend: Option<Backend>,

        /// Print records as a JSON array instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Regenerate a visually similar PDF with varied times
    Regenerate {
        /// PDF to read (bare filenames are also looked up under input/)
        input: PathBuf,

        /// How far times may deviate from the originals
        #[arg(long, default_value_t = VariationLevel::Moderate)]
        level: VariationLevel,

        /// Output path (default: output/<stem>_regenerated.pdf)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Seed for reproducible variation
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            backend,
            json,
        } => extract(&resolve_input(input), backend, json),
        Commands::Regenerate {
            input,
            level,
            output,
            seed,
        } => regenerate(&resolve_input(input), level, output, seed),
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn extract(input: &Path, backend: Option<Backend>, json: bool) -> Result<()> {
    let records = timecard_extract::extract_records(input, backend)
        .with_context(|| format!("extracting {}", input.display()))?;
    if records.is_empty() {
        bail!("no attendance records found in {}", input.display());
    }

    if json {
        let dtos: Vec<_> = records.iter().map(AttendanceRecord::to_dto).collect();
        println!("{}", serde_json::to_string_pretty(&dtos)?);
    } else {
        print_table(&records);
    }
    Ok(())
}

fn regenerate(
    input: &Path,
    level: VariationLevel,
    output: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let bytes = read_input(input)?;

    let text = timecard_extract::extract_text(&bytes, None)
        .with_context(|| format!("extracting text from {}", input.display()))?;
    let records = timecard_extract::parse_text(&text);
    if records.is_empty() {
        bail!("no attendance records found in {}", input.display());
    }

    // Geometry failures degrade to the default layout; the data still exists.
    let model = match analyze_pdf(&bytes) {
        Ok(model) => model,
        Err(e) => {
            warn!(error = %e, "layout analysis failed, using default layout");
            StructureModel::default()
        }
    };

    let mut generator = match seed {
        Some(seed) => VariationGenerator::with_seed(level, seed),
        None => VariationGenerator::new(level),
    };
    let varied = generator.vary_all(&records);

    let out_path = output.unwrap_or_else(|| default_output(input));
    write_records(&varied, &model, &out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;

    info!(records = varied.len(), level = %level, "regeneration complete");
    println!("Wrote {} ({} records, {} variation)", out_path.display(), varied.len(), level);
    Ok(())
}

fn print_table(records: &[AttendanceRecord]) {
    println!("{:<12} {:>6} {:>6} {:>6} {:>7}", "Date", "Start", "End", "Break", "Hours");
    for record in records {
        let dto = record.to_dto();
        let hours = record
            .worked_hours()
            .map(|h| format!("{:.2}", h))
            .unwrap_or_default();
        println!(
            "{:<12} {:>6} {:>6} {:>6} {:>7}",
            dto.date,
            dto.start.unwrap_or_default(),
            dto.end.unwrap_or_default(),
            dto.break_duration.unwrap_or_default(),
            hours,
        );
    }
}

/// Read an input PDF, reporting a missing file with the same typed variant
/// the extraction pipeline uses.
fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        bail!(ExtractError::FileNotFound(path.display().to_string()));
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Resolve a bare filename against the conventional input directory.
fn resolve_input(path: PathBuf) -> PathBuf {
    if path.exists() {
        return path;
    }
    let candidate = Path::new(INPUT_DIR).join(&path);
    if candidate.exists() {
        candidate
    } else {
        path
    }
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "timecard".to_string());
    Path::new(OUTPUT_DIR).join(format!("{}_regenerated.pdf", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_uses_stem() {
        let out = default_output(Path::new("input/may_report.pdf"));
        assert_eq!(out, Path::new("output/may_report_regenerated.pdf"));
    }

    #[test]
    fn test_resolve_input_prefers_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.pdf");
        std::fs::write(&file, b"x").unwrap();
        assert_eq!(resolve_input(file.clone()), file);
    }

    #[test]
    fn test_missing_input_passes_through_unchanged() {
        let path = PathBuf::from("/no/such/report.pdf");
        assert_eq!(resolve_input(path.clone()), path);
    }

    #[test]
    fn test_regenerate_missing_input_is_file_not_found() {
        let err = regenerate(
            Path::new("/no/such/report.pdf"),
            VariationLevel::Moderate,
            None,
            Some(1),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtractError>(),
            Some(ExtractError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_cli_parses_regenerate_flags() {
        let cli = Cli::try_parse_from([
            "timecard",
            "regenerate",
            "report.pdf",
            "--level",
            "significant",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Regenerate { level, seed, .. } => {
                assert_eq!(level, VariationLevel::Significant);
                assert_eq!(seed, Some(7));
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
