// LogTally - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. CLI-over-config option merging
// 4. Running the classification pipeline and mapping failure to exit code 1

use clap::Parser;
use std::path::PathBuf;

use logtally::app::pipeline::{self, PipelineOptions};
use logtally::core::export::ReportFormat;
use logtally::core::model::ClassifyMode;
use logtally::core::ruleset::LoadOptions;
use logtally::platform::config;
use logtally::util::{constants, logging};

/// LogTally - rule-based log classification.
///
/// Scans a log file line by line against named regular-expression rules,
/// prints per-rule match counts, writes a report named after the log's base
/// name under the metrics directory, and moves the processed log into the
/// processed directory.
#[derive(Parser, Debug)]
#[command(name = "logtally", version, about)]
struct Cli {
    /// Log file to classify.
    log_file: PathBuf,

    /// Rules file: TOML [[rule]] entries with an optional name and a
    /// required regex.
    rules_file: PathBuf,

    /// Collect the matching lines into the report alongside the counts.
    #[arg(long)]
    collect: bool,

    /// Match case-insensitively (default is case-sensitive).
    #[arg(short = 'i', long = "case-insensitive")]
    case_insensitive: bool,

    /// Skip rules whose pattern fails to compile instead of aborting.
    #[arg(long)]
    lenient: bool,

    /// Report format: "json" or "csv".
    #[arg(short = 'F', long = "format")]
    format: Option<String>,

    /// Directory that receives the processed log file.
    #[arg(long = "processed-dir")]
    processed_dir: Option<PathBuf>,

    /// Directory that receives the report file.
    #[arg(long = "metrics-dir")]
    metrics_dir: Option<PathBuf>,

    /// Path to an alternative config.toml.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let (config, warnings) = config::load_config(cli.config.as_deref());

    logging::init(cli.debug, config.log_level.as_deref());

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        log = %cli.log_file.display(),
        rules = %cli.rules_file.display(),
        "LogTally starting"
    );

    // CLI flags take precedence over config values.
    let format = match cli.format.as_deref() {
        Some(name) => match ReportFormat::from_name(name) {
            Some(f) => f,
            None => {
                eprintln!(
                    "Error: report format '{name}' is not recognised (expected \"json\" or \"csv\")"
                );
                std::process::exit(1);
            }
        },
        None => config.format,
    };

    let options = PipelineOptions {
        log_path: cli.log_file,
        rules_path: cli.rules_file,
        processed_dir: cli.processed_dir.unwrap_or(config.processed_dir),
        metrics_dir: cli.metrics_dir.unwrap_or(config.metrics_dir),
        mode: if cli.collect {
            ClassifyMode::Collect
        } else {
            ClassifyMode::Count
        },
        format,
        load: LoadOptions {
            case_insensitive: cli.case_insensitive || config.case_insensitive,
            lenient: cli.lenient || config.lenient,
        },
    };

    match pipeline::run(&options) {
        Ok(outcome) => {
            tracing::info!(
                report = %outcome.report_path.display(),
                archived = %outcome.archived_path.display(),
                "Run complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
