// LogTally - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies; these types are the shared vocabulary across
// all layers.

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

// =============================================================================
// Rules
// =============================================================================

/// A named regular-expression rule used to classify log lines.
///
/// Produced exclusively by the rule set loader; `name` is guaranteed
/// non-empty and unique within its `RuleSet`.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Rule identifier; report entries are keyed by this.
    pub name: String,

    /// Compiled pattern. Matching is unanchored sub-string search unless
    /// the pattern itself anchors.
    pub pattern: Regex,
}

/// The validated, ordered collection of rules loaded from configuration.
///
/// Immutable after load. Insertion order is preserved from the rules file
/// and determines report iteration order; it never affects counts because
/// every rule is evaluated against every line independently.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Invariants (non-empty, unique names) are enforced by the loader.
    pub(crate) fn new(rules: Vec<Rule>) -> Self {
        debug_assert!(!rules.is_empty());
        Self { rules }
    }

    /// The rules in load order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// =============================================================================
// Classification mode
// =============================================================================

/// What the classifier records per matching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifyMode {
    /// Count matching lines only.
    #[default]
    Count,

    /// Count matching lines and collect the lines themselves, in file order.
    Collect,
}

// =============================================================================
// Match report
// =============================================================================

/// Per-rule result of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTally {
    /// Name of the rule this tally belongs to.
    pub name: String,

    /// Number of lines with at least one match, counted at most once per
    /// line regardless of how many times the pattern matches within it.
    pub count: u64,

    /// The matching lines in file order. `Some` only in collect mode.
    pub lines: Option<Vec<String>>,
}

/// The result of one classification pass: one tally per rule, in rule set
/// order.
///
/// Created fresh per invocation and never merged across runs. Serialises to
/// a single JSON object whose keys appear in rule set order: count mode maps
/// each name to its count, collect mode maps each name to
/// `{"count": N, "lines": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReport {
    tallies: Vec<RuleTally>,
    lines_scanned: u64,
}

impl MatchReport {
    /// Zero-initialise one tally per rule, in rule set order, before any
    /// line is processed.
    pub(crate) fn with_rules(rules: &RuleSet, mode: ClassifyMode) -> Self {
        let tallies = rules
            .rules()
            .iter()
            .map(|rule| RuleTally {
                name: rule.name.clone(),
                count: 0,
                lines: match mode {
                    ClassifyMode::Count => None,
                    ClassifyMode::Collect => Some(Vec::new()),
                },
            })
            .collect();
        Self {
            tallies,
            lines_scanned: 0,
        }
    }

    /// Record a match for the rule at `index` (rule set order).
    pub(crate) fn record_match(&mut self, index: usize, line: &str) {
        let tally = &mut self.tallies[index];
        tally.count += 1;
        if let Some(lines) = tally.lines.as_mut() {
            lines.push(line.to_string());
        }
    }

    pub(crate) fn note_line(&mut self) {
        self.lines_scanned += 1;
    }

    /// The per-rule tallies in rule set order.
    pub fn tallies(&self) -> &[RuleTally] {
        &self.tallies
    }

    /// Count for a rule by name, `None` if the rule does not exist.
    pub fn count_for(&self, name: &str) -> Option<u64> {
        self.tallies
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.count)
    }

    /// Total lines consumed from the source. Diagnostic only; not part of
    /// the serialised report object.
    pub fn lines_scanned(&self) -> u64 {
        self.lines_scanned
    }

    /// Whether the report carries collected lines (collect mode).
    pub fn has_lines(&self) -> bool {
        self.tallies.first().is_some_and(|t| t.lines.is_some())
    }
}

impl Serialize for MatchReport {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(serde::Serialize)]
        struct CollectedTally<'a> {
            count: u64,
            lines: &'a [String],
        }

        let mut map = serializer.serialize_map(Some(self.tallies.len()))?;
        for tally in &self.tallies {
            match tally.lines.as_deref() {
                Some(lines) => map.serialize_entry(
                    &tally.name,
                    &CollectedTally {
                        count: tally.count,
                        lines,
                    },
                )?,
                None => map.serialize_entry(&tally.name, &tally.count)?,
            }
        }
        map.end()
    }
}
