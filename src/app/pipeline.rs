// LogTally - app/pipeline.rs
//
// One classification invocation from rule loading to archival.
//
// Stage order is a recoverability contract:
//   1. load rules      -- failure: log untouched, nothing written
//   2. classify        -- failure: log untouched, nothing written
//   3. console summary -- stdout, before any persistence
//   4. write report    -- failure: log untouched, retry possible
//   5. archive log     -- failure: original preserved unless the move
//                         fully completed
// The report is written before the log is moved so a failed persistence
// step always leaves the input retryable.

use crate::app::ruleset_mgr;
use crate::core::classify::classify;
use crate::core::export::{self, ReportFormat};
use crate::core::model::{ClassifyMode, MatchReport};
use crate::core::ruleset::LoadOptions;
use crate::platform::fs as platform_fs;
use crate::util::error::{ClassifyError, LogTallyError, PersistenceError, Result};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Everything one invocation needs, fully resolved (CLI and config merging
/// happens in main).
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Log file to classify.
    pub log_path: PathBuf,
    /// Rules file to load.
    pub rules_path: PathBuf,
    /// Directory receiving the processed log.
    pub processed_dir: PathBuf,
    /// Directory receiving the report.
    pub metrics_dir: PathBuf,
    /// Count only, or count and collect matching lines.
    pub mode: ClassifyMode,
    /// Report serialisation format.
    pub format: ReportFormat,
    /// Rule loading options.
    pub load: LoadOptions,
}

/// Artifacts of a successful invocation.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// The match report handed off to persistence.
    pub report: MatchReport,
    /// Where the report was written.
    pub report_path: PathBuf,
    /// Where the log ended up.
    pub archived_path: PathBuf,
}

/// Run one classification pass end to end.
pub fn run(options: &PipelineOptions) -> Result<PipelineOutcome> {
    let rules = ruleset_mgr::load_ruleset(&options.rules_path, options.load)?;

    let lines = platform_fs::open_log_lines(&options.log_path)?;
    let report = classify(lines, &rules, options.mode).map_err(|e| match e {
        ClassifyError::SourceRead {
            line_number,
            source,
        } => LogTallyError::SourceRead {
            path: options.log_path.clone(),
            line_number,
            source,
        },
    })?;

    tracing::info!(
        lines = report.lines_scanned(),
        rules = rules.len(),
        "Classification complete"
    );

    // Operator summary goes to stdout before anything is persisted.
    print!("{}", export::render_summary(&report));

    let report_path = write_report(&report, options)?;
    let archived_path = platform_fs::archive_log(&options.log_path, &options.processed_dir)?;

    Ok(PipelineOutcome {
        report,
        report_path,
        archived_path,
    })
}

/// Write the report under the metrics directory, named after the log file's
/// base name without extension.
fn write_report(report: &MatchReport, options: &PipelineOptions) -> Result<PathBuf> {
    platform_fs::ensure_dir(&options.metrics_dir)?;

    let stem = report_stem(&options.log_path);
    let report_path = options
        .metrics_dir
        .join(format!("{stem}.{}", options.format.extension()));

    let file = fs::File::create(&report_path).map_err(|e| PersistenceError::WriteReport {
        path: report_path.clone(),
        source: e,
    })?;
    let writer = BufWriter::new(file);

    match options.format {
        ReportFormat::Json => export::write_json_report(report, writer, &report_path)?,
        ReportFormat::Csv => export::write_csv_report(report, writer, &report_path)?,
    }

    tracing::info!(path = %report_path.display(), "Report written");
    Ok(report_path)
}

fn report_stem(log_path: &Path) -> String {
    log_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "log".to_string())
}

// =============================================================================
// Tests
// =============================================================================
