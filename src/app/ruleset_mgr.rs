// LogTally - app/ruleset_mgr.rs
//
// Disk side of rule set loading: existence and size checks, file read,
// then delegation to the core loader. The core layer never touches the
// filesystem; this module feeds it content.

use crate::core::model::RuleSet;
use crate::core::ruleset::{self, LoadOptions};
use crate::util::constants;
use crate::util::error::{LogTallyError, Result, RuleSetError};
use std::io;
use std::path::Path;

/// Load, validate, and compile the rule set at `path`.
///
/// A missing file is `SourceNotFound`; everything else rule-related is a
/// `RuleSetError` carrying the file position of the offending entry.
pub fn load_ruleset(path: &Path, options: LoadOptions) -> Result<RuleSet> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(LogTallyError::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(RuleSetError::Io {
                path: path.to_path_buf(),
                source: e,
            }
            .into())
        }
    };

    if metadata.len() > constants::MAX_RULES_FILE_SIZE {
        return Err(RuleSetError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_RULES_FILE_SIZE,
        }
        .into());
    }

    let content = std::fs::read_to_string(path).map_err(|e| RuleSetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let def = ruleset::parse_rules_toml(&content, path)?;
    let set = ruleset::validate_and_compile(def, path, options)?;

    tracing::info!(
        rules = set.len(),
        path = %path.display(),
        lenient = options.lenient,
        case_insensitive = options.case_insensitive,
        "Rule set loaded"
    );

    Ok(set)
}

// =============================================================================
// Tests
// =============================================================================
