// Run metrics module
//
// Counters describing what a backup run did, updated by the walker.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::models::{DirOutcome, FileOutcome};

/// Counters for one backup run.
///
/// Uses atomic operations so a reporting thread can read the counters while
/// the walk is in progress.
#[derive(Debug)]
pub struct BackupMetrics {
    /// Mirrored directories created by the pre-creation pass
    pub dirs_created: AtomicUsize,

    /// Directories whose files were processed
    pub dirs_processed: AtomicUsize,

    pub dirs_skipped_by_name: AtomicUsize,
    pub dirs_skipped_as_dataset: AtomicUsize,
    pub dirs_skipped_as_backup_root: AtomicUsize,

    pub files_copied: AtomicUsize,

    /// Oversized files copied because of the always-copy list
    pub files_copied_as_allowed: AtomicUsize,

    pub files_excluded: AtomicUsize,
    pub files_failed: AtomicUsize,

    /// Total bytes written to the backup
    pub bytes_copied: AtomicU64,

    start_time: Instant,
}

impl BackupMetrics {
    pub fn new() -> Self {
        Self {
            dirs_created: AtomicUsize::new(0),
            dirs_processed: AtomicUsize::new(0),
            dirs_skipped_by_name: AtomicUsize::new(0),
            dirs_skipped_as_dataset: AtomicUsize::new(0),
            dirs_skipped_as_backup_root: AtomicUsize::new(0),
            files_copied: AtomicUsize::new(0),
            files_copied_as_allowed: AtomicUsize::new(0),
            files_excluded: AtomicUsize::new(0),
            files_failed: AtomicUsize::new(0),
            bytes_copied: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_dir_created(&self) {
        self.dirs_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dir(&self, outcome: DirOutcome) {
        let counter = match outcome {
            DirOutcome::Processed => &self.dirs_processed,
            DirOutcome::SkippedByName => &self.dirs_skipped_by_name,
            DirOutcome::SkippedAsDataset => &self.dirs_skipped_as_dataset,
            DirOutcome::SkippedAsBackupRoot => &self.dirs_skipped_as_backup_root,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self, outcome: FileOutcome) {
        let counter = match outcome {
            FileOutcome::CopiedNormally => &self.files_copied,
            FileOutcome::CopiedAsAllowed => &self.files_copied_as_allowed,
            FileOutcome::ExcludedBySize => &self.files_excluded,
            FileOutcome::FailedCopy => &self.files_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, bytes: u64) {
        self.bytes_copied.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }

    /// Time since the metrics were created
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Backup Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Directories: {} created, {} processed, {} skipped by name, {} datasets, {} backup root",
            Self::get(&self.dirs_created),
            Self::get(&self.dirs_processed),
            Self::get(&self.dirs_skipped_by_name),
            Self::get(&self.dirs_skipped_as_dataset),
            Self::get(&self.dirs_skipped_as_backup_root)
        );
        tracing::info!(
            "Files: {} copied, {} allow-listed, {} excluded, {} failed ({:.2} MB written)",
            Self::get(&self.files_copied),
            Self::get(&self.files_copied_as_allowed),
            Self::get(&self.files_excluded),
            Self::get(&self.files_failed),
            self.bytes_copied.load(Ordering::Relaxed) as f64 / (1024.0 * 1024.0)
        );
    }
}

impl Default for BackupMetrics {
    fn default() -> Self {
        Self::new()
    }
}
