// LogTally - core/ruleset.rs
//
// Rule set loading, validation, and compilation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::ruleset_mgr which feeds content here.

use crate::core::model::{Rule, RuleSet};
use crate::util::constants;
use crate::util::error::RuleSetError;
use regex::RegexBuilder;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

// =============================================================================
// TOML deserialisation structures (raw input)
// =============================================================================

/// Raw rules file shape as deserialised from TOML: an array of `[[rule]]`
/// tables. This is validated and compiled into a `RuleSet` for runtime use.
///
/// Unknown keys on an entry are ignored for forward compatibility -- a newer
/// rules file can be used with an older binary without failing the load.
#[derive(Debug, Deserialize)]
pub struct RuleSetDefinition {
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDefinition>,
}

/// One raw `[[rule]]` entry. Both fields are optional at parse time so that
/// validation can report the 1-based entry position instead of a generic
/// deserialisation error.
#[derive(Debug, Deserialize)]
pub struct RuleDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub regex: Option<String>,
}

// =============================================================================
// Load options
// =============================================================================

/// Options governing validation and compilation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Compile every pattern case-insensitively. The default is
    /// case-sensitive, matching the regex engine's own default.
    pub case_insensitive: bool,

    /// When true, entries whose pattern is rejected (compile failure or
    /// over-length) are skipped with a warning instead of aborting the
    /// load. Structural problems -- a missing `regex` field or a duplicate
    /// name -- abort in both modes.
    pub lenient: bool,
}

// =============================================================================
// Parsing and compilation
// =============================================================================

/// Parse a TOML string into a `RuleSetDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_rules_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<RuleSetDefinition, RuleSetError> {
    toml::from_str(toml_content).map_err(|e| RuleSetError::Parse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `RuleSetDefinition` and compile it into a runtime `RuleSet`.
///
/// Validation, in order per entry (positions are 1-based):
/// - `regex` must be present, otherwise `MissingRegex`.
/// - `name` defaults to `rule_<position>` when missing or empty.
/// - Names must be unique across the set (`DuplicateName`).
/// - Patterns must be within the length cap and must compile; in lenient
///   mode a rejected pattern drops the entry with a warning.
///
/// A load that yields zero compiled rules fails with `EmptyRuleSet`.
pub fn validate_and_compile(
    def: RuleSetDefinition,
    source_path: &Path,
    options: LoadOptions,
) -> Result<RuleSet, RuleSetError> {
    if def.rules.len() > constants::MAX_RULES {
        return Err(RuleSetError::TooManyRules {
            count: def.rules.len(),
            max: constants::MAX_RULES,
        });
    }

    let mut rules: Vec<Rule> = Vec::with_capacity(def.rules.len());
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(def.rules.len());

    for (index, entry) in def.rules.into_iter().enumerate() {
        let position = index + 1;

        let pattern_str = match entry.regex {
            Some(p) => p,
            None => {
                return Err(RuleSetError::MissingRegex {
                    path: source_path.to_path_buf(),
                    position,
                })
            }
        };

        let name = match entry.name {
            Some(n) if !n.is_empty() => n,
            _ => format!("rule_{position}"),
        };

        if let Some(&first) = seen.get(&name) {
            return Err(RuleSetError::DuplicateName {
                name,
                first,
                second: position,
            });
        }
        seen.insert(name.clone(), position);

        match compile_pattern(position, &name, &pattern_str, options.case_insensitive) {
            Ok(pattern) => rules.push(Rule { name, pattern }),
            Err(e) if options.lenient => {
                tracing::warn!(
                    rule = position,
                    name = %name,
                    error = %e,
                    "Skipping rule with rejected pattern (lenient mode)"
                );
            }
            Err(e) => return Err(e),
        }
    }

    if rules.is_empty() {
        return Err(RuleSetError::EmptyRuleSet {
            path: source_path.to_path_buf(),
        });
    }

    Ok(RuleSet::new(rules))
}

/// Compile a rule pattern with length validation to prevent ReDoS.
fn compile_pattern(
    position: usize,
    name: &str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<regex::Regex, RuleSetError> {
    if pattern.len() > constants::MAX_RULE_PATTERN_LENGTH {
        return Err(RuleSetError::PatternTooLong {
            position,
            name: name.to_string(),
            length: pattern.len(),
            max_length: constants::MAX_RULE_PATTERN_LENGTH,
        });
    }

    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| RuleSetError::InvalidPattern {
            position,
            name: name.to_string(),
            pattern: pattern.to_string(),
            source: e,
        })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_RULES_TOML: &str = r#"
[[rule]]
name = "critical"
regex = "CRITICAL"

[[rule]]
name = "error"
regex = "ERROR"

[[rule]]
regex = "timeout"
"#;

    fn load(toml: &str, options: LoadOptions) -> Result<RuleSet, RuleSetError> {
        let path = PathBuf::from("rules.toml");
        let def = parse_rules_toml(toml, &path)?;
        validate_and_compile(def, &path, options)
    }

    #[test]
    fn test_load_valid_rules_preserves_order() {
        let set = load(VALID_RULES_TOML, LoadOptions::default()).unwrap();
        let names: Vec<_> = set.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["critical", "error", "rule_3"]);
    }

    #[test]
    fn test_missing_name_synthesised_from_position() {
        let set = load(VALID_RULES_TOML, LoadOptions::default()).unwrap();
        assert_eq!(set.rules()[2].name, "rule_3");
        assert_eq!(set.rules()[2].pattern.as_str(), "timeout");
    }

    #[test]
    fn test_empty_name_synthesised_from_position() {
        let toml = r#"
[[rule]]
name = ""
regex = "WARN"
"#;
        let set = load(toml, LoadOptions::default()).unwrap();
        assert_eq!(set.rules()[0].name, "rule_1");
    }

    #[test]
    fn test_load_is_idempotent() {
        let a = load(VALID_RULES_TOML, LoadOptions::default()).unwrap();
        let b = load(VALID_RULES_TOML, LoadOptions::default()).unwrap();
        let seq = |s: &RuleSet| {
            s.rules()
                .iter()
                .map(|r| (r.name.clone(), r.pattern.as_str().to_string()))
                .collect::<Vec<_>>()
        };
        assert_eq!(seq(&a), seq(&b));
    }

    #[test]
    fn test_missing_regex_reports_position() {
        let toml = r#"
[[rule]]
name = "ok"
regex = "fine"

[[rule]]
name = "broken"
"#;
        let result = load(toml, LoadOptions::default());
        match result.unwrap_err() {
            RuleSetError::MissingRegex { position, .. } => assert_eq!(position, 2),
            other => panic!("Expected MissingRegex, got: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern_strict_aborts() {
        let toml = r#"
[[rule]]
name = "bad"
regex = "[unclosed"
"#;
        let result = load(toml, LoadOptions::default());
        assert!(matches!(
            result.unwrap_err(),
            RuleSetError::InvalidPattern { position: 1, .. }
        ));
    }

    #[test]
    fn test_invalid_pattern_lenient_skips_entry() {
        let toml = r#"
[[rule]]
name = "bad"
regex = "[unclosed"

[[rule]]
name = "good"
regex = "ERROR"
"#;
        let options = LoadOptions {
            lenient: true,
            ..LoadOptions::default()
        };
        let set = load(toml, options).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules()[0].name, "good");
    }

    #[test]
    fn test_lenient_with_nothing_left_is_empty_rule_set() {
        let toml = r#"
[[rule]]
name = "bad"
regex = "[unclosed"
"#;
        let options = LoadOptions {
            lenient: true,
            ..LoadOptions::default()
        };
        let result = load(toml, options);
        assert!(matches!(
            result.unwrap_err(),
            RuleSetError::EmptyRuleSet { .. }
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let toml = r#"
[[rule]]
name = "dup"
regex = "A"

[[rule]]
name = "dup"
regex = "B"
"#;
        let result = load(toml, LoadOptions::default());
        match result.unwrap_err() {
            RuleSetError::DuplicateName {
                name,
                first,
                second,
            } => {
                assert_eq!(name, "dup");
                assert_eq!((first, second), (1, 2));
            }
            other => panic!("Expected DuplicateName, got: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_applies_to_synthesised_names() {
        // An explicit "rule_2" collides with the name synthesised for the
        // unnamed second entry.
        let toml = r#"
[[rule]]
name = "rule_2"
regex = "A"

[[rule]]
regex = "B"
"#;
        let result = load(toml, LoadOptions::default());
        assert!(matches!(
            result.unwrap_err(),
            RuleSetError::DuplicateName { .. }
        ));
    }

    #[test]
    fn test_no_rules_is_empty_rule_set() {
        let result = load("", LoadOptions::default());
        assert!(matches!(
            result.unwrap_err(),
            RuleSetError::EmptyRuleSet { .. }
        ));
    }

    #[test]
    fn test_malformed_root_is_parse_error() {
        let result = load("rule = 3", LoadOptions::default());
        assert!(matches!(result.unwrap_err(), RuleSetError::Parse { .. }));
    }

    #[test]
    fn test_pattern_over_length_cap_rejected() {
        let long = "a".repeat(constants::MAX_RULE_PATTERN_LENGTH + 1);
        let toml = format!(
            r#"
[[rule]]
name = "long"
regex = "{long}"
"#
        );
        let result = load(&toml, LoadOptions::default());
        assert!(matches!(
            result.unwrap_err(),
            RuleSetError::PatternTooLong { .. }
        ));
    }

    #[test]
    fn test_case_insensitive_option() {
        let toml = r#"
[[rule]]
name = "err"
regex = "error"
"#;
        let sensitive = load(toml, LoadOptions::default()).unwrap();
        assert!(!sensitive.rules()[0].pattern.is_match("ERROR: timeout"));

        let options = LoadOptions {
            case_insensitive: true,
            ..LoadOptions::default()
        };
        let insensitive = load(toml, options).unwrap();
        assert!(insensitive.rules()[0].pattern.is_match("ERROR: timeout"));
    }

    #[test]
    fn test_unknown_entry_keys_ignored() {
        let toml = r#"
[[rule]]
name = "ok"
regex = "fine"
comment = "future field"
"#;
        let set = load(toml, LoadOptions::default()).unwrap();
        assert_eq!(set.len(), 1);
    }
}
