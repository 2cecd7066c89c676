// LogTally - platform/config.rs
//
// Platform config directory resolution and optional config.toml loading
// with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. The config file is entirely optional: a
// missing file means defaults, an invalid file means defaults plus
// actionable warnings. CLI flags always take precedence over config values.

use crate::core::export::ReportFormat;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogTally configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logtally/ or %APPDATA%\LogTally\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[rules]` section.
    pub rules: RulesSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[rules]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Skip rules with rejected patterns instead of aborting the load.
    pub lenient: Option<bool>,
    /// Compile patterns case-insensitively.
    pub case_insensitive: Option<bool>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory receiving processed log files.
    pub processed_dir: Option<String>,
    /// Directory receiving report files.
    pub metrics_dir: Option<String>,
    /// Report format: "json" or "csv".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Lenient rule loading.
    pub lenient: bool,
    /// Case-insensitive pattern compilation.
    pub case_insensitive: bool,
    /// Directory receiving processed log files.
    pub processed_dir: PathBuf,
    /// Directory receiving report files.
    pub metrics_dir: PathBuf,
    /// Report format.
    pub format: ReportFormat,
    /// Logging level string (applied before tracing is initialised).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            lenient: false,
            case_insensitive: false,
            processed_dir: PathBuf::from(constants::DEFAULT_PROCESSED_DIR),
            metrics_dir: PathBuf::from(constants::DEFAULT_METRICS_DIR),
            format: ReportFormat::Json,
            log_level: None,
        }
    }
}

/// Load and validate the configuration file.
///
/// `explicit_path` is the --config override; when `None`, the platform
/// config directory is consulted. Returns the validated config and a list
/// of non-fatal warnings. A missing default-location file is a normal
/// first-run condition; a missing explicit path is warned about.
pub fn load_config(explicit_path: Option<&Path>) -> (AppConfig, Vec<String>) {
    let config_path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => PlatformPaths::resolve()
            .config_dir
            .join(constants::CONFIG_FILE_NAME),
    };

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        if explicit_path.is_some() {
            warnings.push(format!(
                "Config file '{}' does not exist. Using defaults.",
                config_path.display()
            ));
        }
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            ));
            return (AppConfig::default(), warnings);
        }
    };

    let mut config = AppConfig::default();

    // -- Rules --
    if let Some(lenient) = raw.rules.lenient {
        config.lenient = lenient;
    }
    if let Some(ci) = raw.rules.case_insensitive {
        config.case_insensitive = ci;
    }

    // -- Output: directories --
    if let Some(ref dir) = raw.output.processed_dir {
        if dir.is_empty() {
            warnings.push(
                "[output] processed_dir is empty. Using default (processed).".to_string(),
            );
        } else {
            config.processed_dir = PathBuf::from(dir);
        }
    }
    if let Some(ref dir) = raw.output.metrics_dir {
        if dir.is_empty() {
            warnings.push("[output] metrics_dir is empty. Using default (metrics).".to_string());
        } else {
            config.metrics_dir = PathBuf::from(dir);
        }
    }

    // -- Output: format --
    if let Some(ref format) = raw.output.format {
        match ReportFormat::from_name(format) {
            Some(f) => config.format = f,
            None => {
                warnings.push(format!(
                    "[output] format = \"{format}\" is not recognised. \
                     Expected \"json\" or \"csv\". Using default (json).",
                ));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_explicit_config_warns_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(Some(&dir.path().join("absent.toml")));
        assert_eq!(warnings.len(), 1);
        assert!(!config.lenient);
        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.processed_dir, PathBuf::from("processed"));
    }

    #[test]
    fn test_valid_config_applied() {
        let (_dir, path) = write_config(
            r#"
[rules]
lenient = true
case_insensitive = true

[output]
processed_dir = "done"
metrics_dir = "reports"
format = "csv"

[logging]
level = "debug"
"#,
        );
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert!(config.lenient);
        assert!(config.case_insensitive);
        assert_eq!(config.processed_dir, PathBuf::from("done"));
        assert_eq!(config.metrics_dir, PathBuf::from("reports"));
        assert_eq!(config.format, ReportFormat::Csv);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unrecognised_values_warn_and_fall_back() {
        let (_dir, path) = write_config(
            r#"
[output]
format = "xml"

[logging]
level = "loud"
"#,
        );
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(warnings.len(), 2);
        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn test_unparseable_config_warns_and_defaults() {
        let (_dir, path) = write_config("not = [valid");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.format, ReportFormat::Json);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (_dir, path) = write_config(
            r#"
[future_section]
key = "value"

[rules]
lenient = true
"#,
        );
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert!(config.lenient);
    }
}
