//! Exclusion bookkeeping: placeholder documents and the end-of-run logs.
//!
//! Documents are pretty-printed JSON with literal UTF-8 and are synced to
//! disk before the file is closed.

use crate::error::{BackupError, Result};
use crate::models::exclusion::LOG_DIR_NAME;
use crate::models::{ErrorEntry, ExclusionList, ExclusionLists};
use crate::services::fsops::{create_dir_all_long, long_path};
use crate::services::path_mapper::join;
use camino::Utf8Path;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::Write;

/// Serialize `document` as pretty JSON with four-space indentation.
///
/// Non-ASCII text is written literally (serde_json never escapes it).
pub fn to_pretty_json<T: Serialize + ?Sized>(document: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    document.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes placeholder documents and accumulates the exclusion lists.
///
/// The recorder is the only owner of [`ExclusionLists`]; the classifier and
/// the walker append to it through the `record_*` methods.
#[derive(Debug, Default)]
pub struct ExclusionRecorder {
    lists: ExclusionLists,
}

impl ExclusionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lists(&self) -> &ExclusionLists {
        &self.lists
    }

    /// Hand the accumulated lists over, leaving the recorder empty.
    pub fn take_lists(&mut self) -> ExclusionLists {
        std::mem::take(&mut self.lists)
    }

    pub fn record_big_file(&mut self, path: &Utf8Path) {
        self.lists.big_files.push(path.to_string());
    }

    pub fn record_file_size_error(&mut self, path: &Utf8Path, error: &BackupError) {
        self.lists
            .file_size_errors
            .push(ErrorEntry::new(path, error_message(error)));
    }

    pub fn record_dataset_folder(&mut self, path: &Utf8Path) {
        self.lists.dataset_folders.push(path.to_string());
    }

    pub fn record_dataset_error(&mut self, path: &Utf8Path, error: &BackupError) {
        self.lists
            .dataset_errors
            .push(ErrorEntry::new(path, error_message(error)));
    }

    pub fn record_copy_error(&mut self, path: &Utf8Path, error: &BackupError) {
        self.lists
            .copy_errors
            .push(ErrorEntry::new(path, error_message(error)));
    }

    /// Write `document` as a JSON placeholder at `target`.
    ///
    /// Missing parent directories are created. The file is synced before it
    /// is closed, so a truncated write surfaces as an error.
    pub fn write_placeholder<T: Serialize + ?Sized>(
        &self,
        target: &Utf8Path,
        document: &T,
    ) -> Result<()> {
        let bytes = to_pretty_json(document).map_err(|source| BackupError::Serialize {
            path: target.to_path_buf(),
            source,
        })?;

        let write_err = |source| BackupError::Write {
            path: target.to_path_buf(),
            source,
        };

        if let Some(parent) = target.parent().filter(|p| !p.as_str().is_empty()) {
            create_dir_all_long(parent).map_err(write_err)?;
        }

        let mut file = File::create(long_path(target)).map_err(write_err)?;
        file.write_all(&bytes).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;

        tracing::debug!("Wrote placeholder {}", target);
        Ok(())
    }

    /// Write the five lists to `<backup_root>/log/<name>.json`.
    ///
    /// A list that cannot be written is logged and skipped; the others are
    /// still attempted. Returns the number of lists that failed.
    pub fn flush(&self, backup_root: &Utf8Path) -> usize {
        let log_dir = join(backup_root, LOG_DIR_NAME);
        let mut failed = 0;

        for list in ExclusionList::ALL {
            let target = join(&log_dir, &list.log_file_name());
            match self.write_placeholder(&target, &self.lists.document(list)) {
                Ok(()) => tracing::debug!(
                    "Saved {} ({} entries)",
                    target,
                    self.lists.len_of(list)
                ),
                Err(e) => {
                    tracing::error!("Log save error for {}: {}", list.log_name(), e);
                    failed += 1;
                }
            }
        }

        failed
    }
}

/// Message stored in error lists: the underlying cause when there is one.
fn error_message(error: &BackupError) -> String {
    match error {
        BackupError::Enumeration { source, .. }
        | BackupError::Stat { source, .. }
        | BackupError::Copy { source, .. }
        | BackupError::Write { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BigFilePlaceholder;
    use camino::Utf8PathBuf;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_pretty_json_keeps_non_ascii() {
        let doc = BigFilePlaceholder {
            path: "/자료/영상.mp4".to_string(),
            size_gb: 3.25,
        };
        let text = String::from_utf8(to_pretty_json(&doc).unwrap()).unwrap();
        assert_eq!(
            text,
            "{\n    \"경로\": \"/자료/영상.mp4\",\n    \"용량(GB)\": 3.25\n}"
        );
    }

    #[test]
    fn test_write_placeholder_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = utf8_dir(&temp).join("a/b/dataset_path.json");
        let recorder = ExclusionRecorder::new();

        recorder
            .write_placeholder(&target, &vec!["1.jpg", "2.jpg"])
            .unwrap();

        let written: Vec<String> =
            serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(written, vec!["1.jpg", "2.jpg"]);
    }

    #[test]
    fn test_write_placeholder_reports_write_failure() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        // A regular file where a parent directory is needed
        fs::write(root.join("blocker"), b"x").unwrap();
        let recorder = ExclusionRecorder::new();

        let result = recorder.write_placeholder(&root.join("blocker/doc.json"), &vec![1]);
        assert!(matches!(result, Err(BackupError::Write { .. })));
    }

    #[test]
    fn test_record_methods_fill_lists() {
        let mut recorder = ExclusionRecorder::new();
        let path = Utf8Path::new("/src/a.bin");
        let err = BackupError::Stat {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        recorder.record_big_file(path);
        recorder.record_file_size_error(path, &err);
        recorder.record_dataset_folder(Utf8Path::new("/src/ds"));
        recorder.record_dataset_error(Utf8Path::new("/src/locked"), &err);
        recorder.record_copy_error(path, &err);

        let lists = recorder.lists();
        assert_eq!(lists.big_files, vec!["/src/a.bin"]);
        assert_eq!(lists.dataset_folders, vec!["/src/ds"]);
        assert_eq!(lists.file_size_errors[0].message(), "denied");
        assert_eq!(lists.dataset_errors[0].path(), "/src/locked");
        assert_eq!(lists.copy_errors.len(), 1);

        let taken = recorder.take_lists();
        assert_eq!(taken.error_count(), 3);
        assert!(recorder.lists().big_files.is_empty());
    }

    #[test]
    fn test_flush_writes_all_lists() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        let mut recorder = ExclusionRecorder::new();
        recorder.record_big_file(Utf8Path::new("/src/big.bin"));

        assert_eq!(recorder.flush(&root), 0);

        for list in ExclusionList::ALL {
            assert!(root.join("log").join(list.log_file_name()).is_file());
        }
        let big: Vec<String> = serde_json::from_str(
            &fs::read_to_string(root.join("log/big_file_list.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(big, vec!["/src/big.bin"]);
    }

    #[test]
    fn test_flush_continues_after_failure() {
        let temp = TempDir::new().unwrap();
        let root = utf8_dir(&temp);
        // A directory occupying one log file's name makes only that write fail
        fs::create_dir_all(root.join("log/big_file_list.json")).unwrap();

        let recorder = ExclusionRecorder::new();
        assert_eq!(recorder.flush(&root), 1);
        assert!(root.join("log/auto_backup_error_list.json").is_file());
        assert!(root.join("log/dataset_folder_list.json").is_file());
    }
}
