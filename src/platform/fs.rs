// LogTally - platform/fs.rs
//
// Filesystem helpers: buffered line reading for the classification pass
// and the archival move for consumed log files.

use crate::util::constants;
use crate::util::error::{LogTallyError, PersistenceError};
use chrono::Utc;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

/// Open `path` and return a buffered iterator over its lines, trailing
/// newlines stripped.
///
/// The handle is held for exactly one streaming pass; a missing file maps
/// to `SourceNotFound`, any other open failure keeps its path context.
pub fn open_log_lines(
    path: &Path,
) -> Result<impl Iterator<Item = io::Result<String>>, LogTallyError> {
    match fs::File::open(path) {
        Ok(file) => Ok(io::BufReader::new(file).lines()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LogTallyError::SourceNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(LogTallyError::Io {
            path: path.to_path_buf(),
            operation: "open",
            source: e,
        }),
    }
}

/// Create `path` (and any missing parents) if it does not exist.
pub fn ensure_dir(path: &Path) -> Result<(), PersistenceError> {
    fs::create_dir_all(path).map_err(|e| PersistenceError::CreateDir {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Move a consumed log file into `processed_dir`, returning the archived
/// path.
///
/// An existing target of the same name is never overwritten; the incoming
/// file gets a UTC timestamp infix instead. Rename is attempted first and
/// falls back to copy+remove when the directories are on different
/// filesystems. The original file is only removed once the copy has fully
/// succeeded.
pub fn archive_log(log_path: &Path, processed_dir: &Path) -> Result<PathBuf, PersistenceError> {
    ensure_dir(processed_dir)?;

    let file_name = log_path.file_name().unwrap_or_else(|| OsStr::new("log"));
    let mut target = processed_dir.join(file_name);

    if target.exists() {
        target = processed_dir.join(timestamped_name(file_name));
        tracing::warn!(
            target = %target.display(),
            "Archive target already exists; using timestamped name"
        );
    }

    match fs::rename(log_path, &target) {
        Ok(()) => {
            tracing::info!(
                from = %log_path.display(),
                to = %target.display(),
                "Log archived"
            );
            Ok(target)
        }
        Err(rename_err) => {
            // Rename fails across filesystems; fall back to copy+remove.
            tracing::debug!(
                error = %rename_err,
                "Rename failed; attempting copy+remove"
            );
            copy_then_remove(log_path, &target)
        }
    }
}

fn copy_then_remove(log_path: &Path, target: &Path) -> Result<PathBuf, PersistenceError> {
    fs::copy(log_path, target).map_err(|e| PersistenceError::Archive {
        from: log_path.to_path_buf(),
        to: target.to_path_buf(),
        source: e,
    })?;

    if let Err(e) = fs::remove_file(log_path) {
        // The original must survive an incomplete move; discard the copy so
        // a retry does not find a stale duplicate in the archive.
        let _ = fs::remove_file(target);
        return Err(PersistenceError::Archive {
            from: log_path.to_path_buf(),
            to: target.to_path_buf(),
            source: e,
        });
    }

    tracing::info!(
        from = %log_path.display(),
        to = %target.display(),
        "Log archived (copy+remove)"
    );
    Ok(target.to_path_buf())
}

/// `log.log` -> `log.20240115T143022.log`; extension-less names get the
/// timestamp as a plain suffix.
fn timestamped_name(file_name: &OsStr) -> String {
    let timestamp = Utc::now().format(constants::ARCHIVE_TIMESTAMP_FORMAT);
    let name = file_name.to_string_lossy();
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}.{timestamp}.{ext}"),
        _ => format!("{name}.{timestamp}"),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_log_lines_strips_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.log");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "first\r\nsecond\nthird").unwrap();

        let lines: Vec<String> = open_log_lines(&path)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_open_missing_log_is_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_log_lines(&dir.path().join("absent.log"));
        assert!(matches!(
            result.err().unwrap(),
            LogTallyError::SourceNotFound { .. }
        ));
    }

    #[test]
    fn test_archive_moves_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, "line\n").unwrap();
        let processed = dir.path().join("processed");

        let archived = archive_log(&log, &processed).unwrap();

        assert!(!log.exists(), "original should be gone");
        assert_eq!(archived, processed.join("app.log"));
        assert_eq!(fs::read_to_string(&archived).unwrap(), "line\n");
    }

    #[test]
    fn test_archive_collision_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let processed = dir.path().join("processed");
        fs::create_dir_all(&processed).unwrap();
        fs::write(processed.join("app.log"), "earlier archive\n").unwrap();

        let log = dir.path().join("app.log");
        fs::write(&log, "new run\n").unwrap();

        let archived = archive_log(&log, &processed).unwrap();

        // The earlier archive is untouched and the new file sits beside it.
        assert_eq!(
            fs::read_to_string(processed.join("app.log")).unwrap(),
            "earlier archive\n"
        );
        assert_ne!(archived, processed.join("app.log"));
        assert_eq!(fs::read_to_string(&archived).unwrap(), "new run\n");

        let name = archived.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("app."), "unexpected name {name}");
        assert!(name.ends_with(".log"), "unexpected name {name}");
    }

    #[test]
    fn test_timestamped_name_without_extension() {
        let name = timestamped_name(OsStr::new("logfile"));
        assert!(name.starts_with("logfile."));
        // Suffix is the bare timestamp, not an extension swap.
        assert_eq!(name.matches('.').count(), 1);
    }
}
