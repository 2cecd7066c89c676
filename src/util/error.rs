// LogTally - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every failure carries the path,
// position, or stage it belongs to, and callers can distinguish
// configuration errors from I/O errors programmatically.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for a single LogTally invocation.
///
/// Every variant is fatal to the invocation; there are no retries and no
/// partial results. The variants partition failures by retry-ability:
/// `Rules` means the configuration must be fixed, `SourceNotFound` and
/// `SourceRead` mean the input is unavailable (the log stays in place for a
/// retry), and `Persistence` means classification succeeded but the report
/// or archival step failed.
#[derive(Debug)]
pub enum LogTallyError {
    /// Rules file loading or validation failed. No classification attempted.
    Rules(RuleSetError),

    /// The log or rules file path does not resolve.
    SourceNotFound { path: PathBuf },

    /// I/O failure while streaming the log. No report is produced and the
    /// log file remains in its original location.
    SourceRead {
        path: PathBuf,
        line_number: u64,
        source: io::Error,
    },

    /// Report writing or archival failed after a successful classification.
    Persistence(PersistenceError),

    /// I/O error with path context, outside the categories above.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogTallyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(e) => write!(f, "Rules error: {e}"),
            Self::SourceNotFound { path } => {
                write!(f, "'{}' does not exist", path.display())
            }
            Self::SourceRead {
                path,
                line_number,
                source,
            } => write!(
                f,
                "Read error in '{}' at line {line_number}: {source}",
                path.display()
            ),
            Self::Persistence(e) => write!(f, "Persistence error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogTallyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rules(e) => Some(e),
            Self::SourceNotFound { .. } => None,
            Self::SourceRead { source, .. } => Some(source),
            Self::Persistence(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule set errors
// ---------------------------------------------------------------------------

/// Errors related to rules file loading, validation, and compilation.
///
/// Positions are 1-based indices into the `[[rule]]` array as written in the
/// file, so diagnostics line up with what the operator sees.
#[derive(Debug)]
pub enum RuleSetError {
    /// The rules file could not be parsed as the expected list-of-tables
    /// TOML shape.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// The rules file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A rule entry is missing its required `regex` field.
    MissingRegex { path: PathBuf, position: usize },

    /// A rule's pattern failed to compile (strict mode only; lenient mode
    /// skips the entry with a warning instead).
    InvalidPattern {
        position: usize,
        name: String,
        pattern: String,
        source: regex::Error,
    },

    /// A rule's pattern exceeds the maximum allowed length.
    PatternTooLong {
        position: usize,
        name: String,
        length: usize,
        max_length: usize,
    },

    /// Two rules resolve to the same name. The report is keyed by name, so
    /// a silent overwrite would drop the earlier rule's counts.
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },

    /// The rules file yielded zero usable rules.
    EmptyRuleSet { path: PathBuf },

    /// The rules file defines more rules than the configured maximum.
    TooManyRules { count: usize, max: usize },

    /// I/O error reading the rules file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RuleSetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { path, source } => {
                write!(f, "Failed to parse rules '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Rules file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingRegex { path, position } => write!(
                f,
                "Rules file '{}': rule {position} is missing the required 'regex' field",
                path.display()
            ),
            Self::InvalidPattern {
                position,
                name,
                pattern,
                source,
            } => write!(
                f,
                "Rule {position} ('{name}'): invalid pattern '{pattern}': {source}"
            ),
            Self::PatternTooLong {
                position,
                name,
                length,
                max_length,
            } => write!(
                f,
                "Rule {position} ('{name}'): pattern is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::DuplicateName {
                name,
                first,
                second,
            } => write!(
                f,
                "Duplicate rule name '{name}' (rules {first} and {second})"
            ),
            Self::EmptyRuleSet { path } => {
                write!(f, "Rules file '{}' contains no usable rules", path.display())
            }
            Self::TooManyRules { count, max } => {
                write!(f, "Rules file defines {count} rules, maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(f, "I/O error reading rules '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RuleSetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::InvalidPattern { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RuleSetError> for LogTallyError {
    fn from(e: RuleSetError) -> Self {
        Self::Rules(e)
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// Errors raised by the classification pass itself.
///
/// The classifier is pure apart from the line source's read effects, so the
/// only failure mode is a read error surfacing mid-stream. Partial progress
/// is discarded: the caller never sees a half-built report.
#[derive(Debug)]
pub enum ClassifyError {
    /// The line source failed mid-stream.
    SourceRead { line_number: u64, source: io::Error },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceRead {
                line_number,
                source,
            } => write!(f, "Read failure at line {line_number}: {source}"),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SourceRead { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

/// Errors related to report writing and log archival.
#[derive(Debug)]
pub enum PersistenceError {
    /// A target directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// JSON serialisation of the report failed.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// CSV serialisation of the report failed.
    Csv { path: PathBuf, source: csv::Error },

    /// I/O error writing the report file.
    WriteReport { path: PathBuf, source: io::Error },

    /// The archival move failed. The original log file is preserved
    /// whenever the move did not fully complete.
    Archive {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "Cannot create directory '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON report error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV report error '{}': {source}", path.display())
            }
            Self::WriteReport { path, source } => {
                write!(f, "Cannot write report '{}': {source}", path.display())
            }
            Self::Archive { from, to, source } => write!(
                f,
                "Cannot archive '{}' to '{}': {source}",
                from.display(),
                to.display()
            ),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::WriteReport { source, .. } => Some(source),
            Self::Archive { source, .. } => Some(source),
        }
    }
}

impl From<PersistenceError> for LogTallyError {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

/// Convenience type alias for LogTally results.
pub type Result<T> = std::result::Result<T, LogTallyError>;
