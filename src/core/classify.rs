// LogTally - core/classify.rs
//
// The classification pass: one linear scan of a line source against a
// compiled rule set, producing a deterministic match report.
// Core layer: consumes any fallible line iterator, never opens files.

use crate::core::model::{ClassifyMode, MatchReport, RuleSet};
use crate::util::error::ClassifyError;
use std::io;

/// Classify a finite sequence of log lines against `rules`.
///
/// The report starts with one zero-valued entry per rule, in rule set
/// order. For each line, in file order, every rule's pattern is tested with
/// unanchored sub-string search semantics; a match increments that rule's
/// counter at most once per line, and in collect mode the line is also
/// appended to the rule's collected list. A line may match any number of
/// rules independently.
///
/// The pass is all-or-nothing: a read error from the line source aborts
/// with `ClassifyError::SourceRead` and partial progress is discarded. An
/// empty source yields an all-zero report, not an error.
pub fn classify<I>(
    lines: I,
    rules: &RuleSet,
    mode: ClassifyMode,
) -> Result<MatchReport, ClassifyError>
where
    I: IntoIterator<Item = io::Result<String>>,
{
    let mut report = MatchReport::with_rules(rules, mode);
    let mut line_number: u64 = 0;

    for line_result in lines {
        line_number += 1;
        let line = line_result.map_err(|source| ClassifyError::SourceRead {
            line_number,
            source,
        })?;

        for (index, rule) in rules.rules().iter().enumerate() {
            if rule.pattern.is_match(&line) {
                report.record_match(index, &line);
            }
        }
        report.note_line();
    }

    tracing::debug!(
        lines = report.lines_scanned(),
        rules = rules.len(),
        "Classification pass complete"
    );

    Ok(report)
}

// =============================================================================
// Tests
// =============================================================================
