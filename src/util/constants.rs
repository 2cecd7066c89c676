// LogTally - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogTally";

/// Application identifier used for config directories.
pub const APP_ID: &str = "LogTally";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Rule set limits
// =============================================================================

/// Maximum number of rules accepted from a single rules file.
pub const MAX_RULES: usize = 1_000;

/// Maximum size of a rules TOML file in bytes.
pub const MAX_RULES_FILE_SIZE: u64 = 256 * 1024; // 256 KB

/// Maximum regex pattern length to bound compile cost and prevent ReDoS.
pub const MAX_RULE_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Output locations
// =============================================================================

/// Default directory (relative to the working directory) that receives
/// processed log files after a successful run.
pub const DEFAULT_PROCESSED_DIR: &str = "processed";

/// Default directory (relative to the working directory) that receives
/// report files.
pub const DEFAULT_METRICS_DIR: &str = "metrics";

/// chrono format string for the UTC infix appended to an archived file name
/// when the archival target already exists.
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config specify one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name, resolved under the platform config directory
/// unless an explicit --config path is given.
pub const CONFIG_FILE_NAME: &str = "config.toml";
