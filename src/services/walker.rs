//! The backup walk: directory pre-creation followed by the copy pass.

use crate::error::{BackupError, Result};
use crate::metrics::BackupMetrics;
use crate::models::{BackupConfig, DirOutcome, FileOutcome, RunSummary};
use crate::services::classifier::Classifier;
use crate::services::fsops::{copy_with_metadata, create_dir_all_long, long_path};
use crate::services::path_mapper::{PathMapper, join, normalize};
use crate::services::recorder::ExclusionRecorder;
use crate::services::throttle::{
    COPY_PROGRESS_INTERVAL, PREPARE_PROGRESS_INTERVAL, ProgressThrottle,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use walkdir::{DirEntry, WalkDir};

/// Normalized UTF-8 form of a path discovered by the walk.
fn utf8_path(path: &Path) -> Result<Utf8PathBuf> {
    let text = path
        .to_str()
        .ok_or_else(|| BackupError::NonUtf8Path(path.to_string_lossy().into_owned()))?;
    Ok(Utf8PathBuf::from(normalize(text)))
}

fn is_dir_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
}

/// Runs a full backup: mirror the directory tree, then copy files.
///
/// # Passes
///
/// 1. **Pre-creation**: every directory that will be visited gets its
///    mirrored directory, so copies never race a missing parent.
/// 2. **Copy**: each directory is classified; the files of processed
///    directories are copied or replaced by placeholders.
///
/// Skip-named directories and the backup root (when nested inside the
/// source) are pruned in both passes. A dataset folder's own files are
/// skipped but its subdirectories are judged on their own.
///
/// Every per-entry failure is recorded and logged; only an unusable source
/// or backup root aborts [`run`](Self::run).
pub struct BackupWalker {
    config: Arc<BackupConfig>,
    mapper: PathMapper,
    classifier: Classifier,
    recorder: ExclusionRecorder,
    metrics: Arc<BackupMetrics>,
}

impl BackupWalker {
    pub fn new(config: BackupConfig) -> Self {
        let config = Arc::new(config);
        Self {
            mapper: PathMapper::from_config(&config),
            classifier: Classifier::new(Arc::clone(&config)),
            recorder: ExclusionRecorder::new(),
            metrics: Arc::new(BackupMetrics::new()),
            config,
        }
    }

    pub fn metrics(&self) -> Arc<BackupMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn recorder(&self) -> &ExclusionRecorder {
        &self.recorder
    }

    /// Execute both passes, flush the exclusion logs, and report.
    pub fn run(mut self) -> Result<RunSummary> {
        let started = Instant::now();
        let source_root = self.config.source_root().to_path_buf();
        let backup_root = self.config.backup_root().to_path_buf();

        if !long_path(&source_root).is_dir() {
            return Err(BackupError::InvalidConfig(format!(
                "source path is not a directory: {}",
                source_root
            )));
        }
        create_dir_all_long(&backup_root).map_err(|source| {
            BackupError::BackupRootUnavailable {
                path: backup_root.clone(),
                source,
            }
        })?;

        tracing::info!("Auto backup: {} -> {}", source_root, backup_root);

        let total_dirs = self.prepare_directories();
        self.copy_tree(total_dirs);

        let failed_log_writes = self.recorder.flush(&backup_root);
        let elapsed = started.elapsed();
        tracing::info!("Spend time (sec): {}", elapsed.as_secs());
        self.metrics.log_summary();

        let lists = self.recorder.take_lists();
        let m = &self.metrics;
        Ok(RunSummary {
            directories_total: total_dirs,
            directories_processed: BackupMetrics::get(&m.dirs_processed),
            files_copied: BackupMetrics::get(&m.files_copied),
            files_copied_as_allowed: BackupMetrics::get(&m.files_copied_as_allowed),
            files_excluded: BackupMetrics::get(&m.files_excluded),
            copy_failures: BackupMetrics::get(&m.files_failed),
            big_files: lists.big_files.len(),
            dataset_folders: lists.dataset_folders.len(),
            errors: lists.error_count(),
            failed_log_writes,
            elapsed,
        })
    }

    /// Create the mirrored directory for every directory the copy pass will
    /// visit. Returns the number of directories visited.
    pub fn prepare_directories(&mut self) -> usize {
        tracing::info!("Creating backup folders...");
        let mut throttle = ProgressThrottle::new(PREPARE_PROGRESS_INTERVAL);
        let mut count = 0;

        let mut dirs = WalkDir::new(self.config.source_root())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_dir_entry);

        while let Some(entry) = dirs.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory: {}", e);
                    continue;
                }
            };
            let dir = match utf8_path(entry.path()) {
                Ok(dir) => dir,
                Err(e) => {
                    tracing::warn!("Skipping directory: {}", e);
                    dirs.skip_current_dir();
                    continue;
                }
            };

            if self.mapper.is_backup_root(&dir) || self.classifier.is_skipped_name(&dir) {
                dirs.skip_current_dir();
                continue;
            }

            let created = self
                .mapper
                .to_backup_path(&dir)
                .and_then(|target| {
                    create_dir_all_long(&target)
                        .map_err(|source| BackupError::Write { path: target, source })
                });
            match created {
                Ok(()) => self.metrics.record_dir_created(),
                Err(e) => tracing::warn!("Failed to create backup folder for {}: {}", dir, e),
            }

            count += 1;
            if throttle.should_emit() {
                tracing::info!("Folders {} created...", count);
            }
        }

        tracing::info!("Folders created: {}. Starting auto backup...", count);
        count
    }

    /// Classify every directory and copy the files of processed ones.
    ///
    /// Returns the number of directories visited, counted the same way as
    /// [`prepare_directories`](Self::prepare_directories).
    pub fn copy_tree(&mut self, total_dirs: usize) -> usize {
        let mut throttle = ProgressThrottle::new(COPY_PROGRESS_INTERVAL);
        let mut visited = 0;

        let mut dirs = WalkDir::new(self.config.source_root())
            .sort_by_file_name()
            .into_iter()
            .filter_entry(is_dir_entry);

        while let Some(entry) = dirs.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable directory: {}", e);
                    continue;
                }
            };

            let dir = match utf8_path(entry.path()) {
                Ok(dir) => dir,
                Err(e) => {
                    tracing::error!("Auto backup error: {}", e);
                    let lossy = Utf8PathBuf::from(entry.path().to_string_lossy().into_owned());
                    self.recorder.record_copy_error(&lossy, &e);
                    dirs.skip_current_dir();
                    continue;
                }
            };

            let outcome = self.classify_directory(&dir);
            self.metrics.record_dir(outcome);
            match outcome {
                DirOutcome::SkippedByName | DirOutcome::SkippedAsBackupRoot => {
                    tracing::debug!("Pruned {} ({:?})", dir, outcome);
                    dirs.skip_current_dir();
                    continue;
                }
                DirOutcome::SkippedAsDataset => {}
                DirOutcome::Processed => self.copy_directory_files(&dir),
            }

            visited += 1;
            if throttle.should_emit() {
                tracing::info!("Completed: {}/{}", visited, total_dirs);
            }
        }

        visited
    }

    /// Decide what happens to a directory in the copy pass.
    pub fn classify_directory(&mut self, dir: &Utf8Path) -> DirOutcome {
        if self.mapper.is_backup_root(dir) {
            DirOutcome::SkippedAsBackupRoot
        } else if self.classifier.is_skipped_name(dir) {
            DirOutcome::SkippedByName
        } else if self.classifier.is_dataset_folder(dir, &mut self.recorder) {
            DirOutcome::SkippedAsDataset
        } else {
            DirOutcome::Processed
        }
    }

    fn copy_directory_files(&mut self, dir: &Utf8Path) {
        let target_dir = match self.mapper.to_backup_path(dir) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!("Auto backup error: {}: {}", dir, e);
                self.recorder.record_copy_error(dir, &e);
                return;
            }
        };

        let names = match self.file_names(dir) {
            Ok(names) => names,
            Err(e) => {
                tracing::error!("Auto backup error: {}: {}", dir, e);
                self.recorder.record_copy_error(dir, &e);
                return;
            }
        };

        for name in names {
            let outcome = self.copy_file(dir, &target_dir, &name);
            self.metrics.record_file(outcome);
        }
    }

    /// Sorted names of the regular files (or links to them) in `dir`.
    ///
    /// Names that are not valid UTF-8 are recorded as copy errors and left out.
    fn file_names(&mut self, dir: &Utf8Path) -> Result<Vec<String>> {
        let enumeration_err = |source| BackupError::Enumeration {
            path: dir.to_path_buf(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(long_path(dir)).map_err(enumeration_err)? {
            let entry = entry.map_err(enumeration_err)?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    let e = BackupError::NonUtf8Path(raw.to_string_lossy().into_owned());
                    tracing::error!("Auto backup error: {}: {}", dir, e);
                    self.recorder.record_copy_error(dir, &e);
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Apply the size policy to one file and copy it if it passes.
    pub fn copy_file(&mut self, dir: &Utf8Path, target_dir: &Utf8Path, name: &str) -> FileOutcome {
        let source = join(dir, name);

        let too_big = self.classifier.is_file_too_big(&source, &mut self.recorder);
        let allowed = too_big && self.classifier.is_always_copy(&source);
        if too_big && !allowed {
            return FileOutcome::ExcludedBySize;
        }

        let target = join(target_dir, name);
        match copy_with_metadata(&source, &target) {
            Ok(bytes) => {
                self.metrics.record_bytes(bytes);
                if allowed {
                    tracing::info!("Copied allow-listed big file {}", source);
                    FileOutcome::CopiedAsAllowed
                } else {
                    FileOutcome::CopiedNormally
                }
            }
            Err(io_err) => {
                let e = BackupError::Copy {
                    from: source.clone(),
                    to: target,
                    source: io_err,
                };
                tracing::error!("Auto backup error: {}", e);
                self.recorder.record_copy_error(&source, &e);
                FileOutcome::FailedCopy
            }
        }
    }
}
