//! Export discovery and OS share hand-off
//!
//! Finds the most recently written CSV export and delegates it to the
//! configured share handler. Modification-time ties are broken by the
//! lexicographically greatest file name, which also selects the newest
//! export since names embed the export millisecond.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tokio::process::Command;
use tracing::{info, warn};

/// MIME type requested for every share action
pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("export storage unavailable: {0}")]
    StorageUnavailable(#[source] std::io::Error),
    #[error("no export found; save one first")]
    NoExportFound,
    #[error("share handler failed to launch: {0}")]
    Launch(#[source] std::io::Error),
}

/// OS share collaborator seam
///
/// Production hands the file to an external handler command; tests record
/// the call. The implementation owns everything past the hand-off - the
/// core never learns which recipient the user picked.
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Present `file` to the user for sharing with the given MIME type
    async fn present(&self, file: &Path, mime: &str) -> Result<(), ShareError>;
}

/// Spawns a configured command with the file to share
///
/// `{file}` and `{mime}` placeholders in the configured arguments are
/// substituted; a configuration without a `{file}` placeholder gets the
/// path appended so the handler always receives it.
pub struct CommandShare {
    command: String,
    args: Vec<String>,
}

impl CommandShare {
    pub fn new(command: &str, args: &[String]) -> Self {
        Self { command: command.to_string(), args: args.to_vec() }
    }

    fn resolved_args(&self, file: &Path, mime: &str) -> Vec<String> {
        let file_str = file.display().to_string();
        let mut resolved: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace("{file}", &file_str).replace("{mime}", mime))
            .collect();
        if !self.args.iter().any(|arg| arg.contains("{file}")) {
            resolved.push(file_str);
        }
        resolved
    }
}

#[async_trait]
impl ShareTarget for CommandShare {
    async fn present(&self, file: &Path, mime: &str) -> Result<(), ShareError> {
        let mut child = Command::new(&self.command)
            .args(self.resolved_args(file, mime))
            .spawn()
            .map_err(ShareError::Launch)?;

        info!(command = %self.command, file = %file.display(), "share_handler_spawned");

        // Reap in the background; the chooser outcome belongs to the OS
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        Ok(())
    }
}

/// Locate the most recent CSV export in `dir`
pub fn latest_export(dir: &Path) -> Result<PathBuf, ShareError> {
    let entries = std::fs::read_dir(dir).map_err(ShareError::StorageUnavailable)?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "export_entry_unreadable");
                continue;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "export_mtime_unreadable");
                continue;
            }
        };

        let newer = match &latest {
            None => true,
            Some((best_time, best_path)) => {
                modified > *best_time
                    || (modified == *best_time && path.file_name() > best_path.file_name())
            }
        };
        if newer {
            latest = Some((modified, path));
        }
    }

    latest.map(|(_, path)| path).ok_or(ShareError::NoExportFound)
}

/// Locate the newest export and hand it to the share target
pub async fn share_latest(dir: &Path, target: &dyn ShareTarget) -> Result<PathBuf, ShareError> {
    let path = latest_export(dir)?;
    target.present(&path, CSV_MIME).await?;
    info!(file = %path.display(), mime = %CSV_MIME, "export_shared");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str, modified: SystemTime) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(modified).unwrap();
        path
    }

    #[test]
    fn test_missing_directory_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("nope");
        assert!(matches!(latest_export(&gone), Err(ShareError::StorageUnavailable(_))));
    }

    #[test]
    fn test_empty_directory_has_no_export() {
        let dir = tempdir().unwrap();
        assert!(matches!(latest_export(dir.path()), Err(ShareError::NoExportFound)));
    }

    #[test]
    fn test_non_csv_files_are_ignored() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        touch(dir.path(), "notes.txt", now);
        touch(dir.path(), "scans_1.csv.bak", now);

        assert!(matches!(latest_export(dir.path()), Err(ShareError::NoExportFound)));
    }

    #[test]
    fn test_latest_modification_time_wins() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        touch(dir.path(), "scans_100.csv", now - Duration::from_secs(60));
        let newer = touch(dir.path(), "scans_200.csv", now);

        assert_eq!(latest_export(dir.path()).unwrap(), newer);
    }

    #[test]
    fn test_mtime_tie_breaks_on_greatest_name() {
        let dir = tempdir().unwrap();
        let same = SystemTime::now();
        touch(dir.path(), "scans_100.csv", same);
        let expected = touch(dir.path(), "scans_900.csv", same);
        touch(dir.path(), "scans_500.csv", same);

        assert_eq!(latest_export(dir.path()).unwrap(), expected);
    }

    #[test]
    fn test_resolved_args_substitutes_placeholders() {
        let share = CommandShare::new(
            "handler",
            &["--type".to_string(), "{mime}".to_string(), "{file}".to_string()],
        );
        let args = share.resolved_args(Path::new("/tmp/scans_1.csv"), CSV_MIME);
        assert_eq!(args, ["--type", "text/csv", "/tmp/scans_1.csv"]);
    }

    #[test]
    fn test_resolved_args_appends_file_without_placeholder() {
        let share = CommandShare::new("xdg-open", &[]);
        let args = share.resolved_args(Path::new("/tmp/scans_1.csv"), CSV_MIME);
        assert_eq!(args, ["/tmp/scans_1.csv"]);
    }

    struct Recording(Mutex<Vec<(PathBuf, String)>>);

    #[async_trait]
    impl ShareTarget for Recording {
        async fn present(&self, file: &Path, mime: &str) -> Result<(), ShareError> {
            self.0.lock().push((file.to_path_buf(), mime.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_share_latest_presents_newest_export() {
        let dir = tempdir().unwrap();
        let now = SystemTime::now();
        touch(dir.path(), "scans_100.csv", now - Duration::from_secs(5));
        let newest = touch(dir.path(), "scans_200.csv", now);

        let target = Recording(Mutex::new(Vec::new()));
        let shared = share_latest(dir.path(), &target).await.unwrap();

        assert_eq!(shared, newest);
        let calls = target.0.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (newest, CSV_MIME.to_string()));
    }
}
