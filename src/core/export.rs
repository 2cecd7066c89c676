// LogTally - core/export.rs
//
// JSON and CSV report writers plus the console summary.
// Core layer: writes to any Write trait object; file handling is owned by
// the app layer.

use crate::core::model::MatchReport;
use crate::util::error::PersistenceError;
use std::io::Write;
use std::path::Path;

/// Report serialisation formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    /// Parse a user-supplied format name. Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// File extension for the report artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Write the report as a pretty-printed JSON object, keys in rule set order.
///
/// `report_path` is used for error context only.
pub fn write_json_report<W: Write>(
    report: &MatchReport,
    mut writer: W,
    report_path: &Path,
) -> Result<(), PersistenceError> {
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| PersistenceError::Json {
        path: report_path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| PersistenceError::WriteReport {
        path: report_path.to_path_buf(),
        source: e,
    })
}

/// Write the report as CSV, one row per rule in rule set order.
///
/// Count mode emits `rule,count`; collect mode adds a `lines` column with
/// the matched lines newline-joined inside the field.
pub fn write_csv_report<W: Write>(
    report: &MatchReport,
    writer: W,
    report_path: &Path,
) -> Result<(), PersistenceError> {
    let csv_err = |e| PersistenceError::Csv {
        path: report_path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    let with_lines = report.has_lines();

    if with_lines {
        csv_writer
            .write_record(["rule", "count", "lines"])
            .map_err(csv_err)?;
    } else {
        csv_writer.write_record(["rule", "count"]).map_err(csv_err)?;
    }

    for tally in report.tallies() {
        if with_lines {
            let joined = tally.lines.as_deref().unwrap_or_default().join("\n");
            csv_writer
                .write_record([tally.name.as_str(), &tally.count.to_string(), &joined])
                .map_err(csv_err)?;
        } else {
            csv_writer
                .write_record([tally.name.as_str(), &tally.count.to_string()])
                .map_err(csv_err)?;
        }
    }

    csv_writer.flush().map_err(|e| PersistenceError::WriteReport {
        path: report_path.to_path_buf(),
        source: e,
    })
}

/// Render the human-readable per-rule summary printed to stdout before the
/// archival step. One `name: count` line per rule, in rule set order.
pub fn render_summary(report: &MatchReport) -> String {
    let mut out = String::new();
    for tally in report.tallies() {
        out.push_str(&tally.name);
        out.push_str(": ");
        out.push_str(&tally.count.to_string());
        out.push('\n');
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
