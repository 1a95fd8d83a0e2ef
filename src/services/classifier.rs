//! Exclusion policy: dataset folders, oversized files, and the always-copy list.
//!
//! Both checks fail closed: when a directory cannot be listed or a file
//! cannot be stat'ed, the entry is treated as excluded and the failure is
//! recorded, so the walk carries on without copying something it could not
//! judge.

use crate::error::{BackupError, Result};
use crate::models::exclusion::{big_file_placeholder_path, bytes_to_gb, dataset_placeholder_name};
use crate::models::{BackupConfig, BigFilePlaceholder};
use crate::services::fsops::long_path;
use crate::services::path_mapper::{PathMapper, join, normalize};
use crate::services::recorder::ExclusionRecorder;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

/// Decides which directories and files are left out of the backup.
///
/// Owns the skip registry: the set of normalized directory paths already
/// confirmed as dataset folders during this run.
#[derive(Debug)]
pub struct Classifier {
    config: Arc<BackupConfig>,
    mapper: PathMapper,
    skip_registry: HashSet<Utf8PathBuf>,
}

impl Classifier {
    pub fn new(config: Arc<BackupConfig>) -> Self {
        let mapper = PathMapper::from_config(&config);
        Self {
            config,
            mapper,
            skip_registry: HashSet::new(),
        }
    }

    /// Number of directories confirmed as dataset folders so far.
    pub fn skipped_count(&self) -> usize {
        self.skip_registry.len()
    }

    /// True if the directory holds more dataset files than the threshold.
    ///
    /// On the first positive verdict the directory is registered, added to the
    /// dataset folder list, and a placeholder listing the qualifying names is
    /// written into its mapped backup directory. Listing failures return true
    /// and are added to the dataset error list.
    pub fn is_dataset_folder(&mut self, dir: &Utf8Path, recorder: &mut ExclusionRecorder) -> bool {
        let dir = Utf8PathBuf::from(normalize(dir.as_str()));
        if self.skip_registry.contains(&dir) {
            return true;
        }

        let names = match self.dataset_file_names(&dir) {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!("Dataset check failed, skipping {}: {}", dir, e);
                recorder.record_dataset_error(&dir, &e);
                return true;
            }
        };

        if names.len() <= self.config.dataset_limit() {
            return false;
        }

        tracing::info!(
            "Dataset folder skipped: {} ({} dataset files)",
            dir,
            names.len()
        );
        self.skip_registry.insert(dir.clone());
        recorder.record_dataset_folder(&dir);

        let written = self.mapper.to_backup_path(&dir).and_then(|target| {
            let placeholder = join(&target, &dataset_placeholder_name());
            recorder.write_placeholder(&placeholder, &names)
        });
        if let Err(e) = written {
            tracing::error!("Failed to write dataset placeholder for {}: {}", dir, e);
        }

        true
    }

    /// Sorted names of the immediate entries whose extension is a dataset format.
    fn dataset_file_names(&self, dir: &Utf8Path) -> Result<Vec<String>> {
        let enumeration_err = |source| BackupError::Enumeration {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(long_path(dir)).map_err(enumeration_err)? {
            let entry = entry.map_err(enumeration_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let qualifies =
                extension_of(&name).is_some_and(|ext| self.config.is_dataset_extension(ext));
            if qualifies {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    /// True if the file is larger than the size ceiling.
    ///
    /// Oversized files are added to the big file list and a placeholder with
    /// the original path and the rounded size is written next to where the
    /// copy would have gone. Stat failures return true and are added to the
    /// file size error list.
    pub fn is_file_too_big(&mut self, file: &Utf8Path, recorder: &mut ExclusionRecorder) -> bool {
        let size = match fs::metadata(long_path(file)) {
            Ok(meta) => meta.len(),
            Err(source) => {
                let e = BackupError::Stat {
                    path: file.to_path_buf(),
                    source,
                };
                tracing::warn!("Size check failed, skipping {}: {}", file, e);
                recorder.record_file_size_error(file, &e);
                return true;
            }
        };

        if size <= self.config.size_limit_bytes() {
            return false;
        }

        let size_gb = bytes_to_gb(size);
        tracing::info!("Big file skipped: {} ({} GB)", file, size_gb);
        recorder.record_big_file(file);

        let document = BigFilePlaceholder {
            path: file.to_string(),
            size_gb,
        };
        let written = self.mapped_file_path(file).and_then(|mapped| {
            recorder.write_placeholder(&big_file_placeholder_path(&mapped, size_gb), &document)
        });
        if let Err(e) = written {
            tracing::error!("Failed to write big file placeholder for {}: {}", file, e);
        }

        true
    }

    /// Backup-side path of a file: its directory is mapped, its name is kept.
    fn mapped_file_path(&self, file: &Utf8Path) -> Result<Utf8PathBuf> {
        match (file.parent(), file.file_name()) {
            (Some(dir), Some(name)) => Ok(join(&self.mapper.to_backup_path(dir)?, name)),
            _ => self.mapper.to_backup_path(file),
        }
    }

    /// True if the file's extension is on the always-copy list.
    pub fn is_always_copy(&self, file: &Utf8Path) -> bool {
        file.file_name()
            .and_then(extension_of)
            .is_some_and(|ext| self.config.is_always_copy_extension(ext))
    }

    /// True if the directory's base name is on the skip list.
    pub fn is_skipped_name(&self, dir: &Utf8Path) -> bool {
        dir.file_name()
            .is_some_and(|name| self.config.is_skipped_dir_name(name))
    }
}

/// Text after the last `.` of a file name. Dot-files such as `.json` count.
fn extension_of(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}
