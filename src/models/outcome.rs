use std::fmt;
use std::time::Duration;

/// Final state of a directory visited by the copy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    SkippedByName,
    SkippedAsDataset,
    SkippedAsBackupRoot,
    Processed,
}

/// Final state of a file inside a processed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Over the size ceiling but on the always-copy list
    CopiedAsAllowed,
    CopiedNormally,
    /// Over the size ceiling (or unreadable size); a placeholder stands in
    ExcludedBySize,
    FailedCopy,
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileOutcome::CopiedAsAllowed => "copied (allow-listed)",
            FileOutcome::CopiedNormally => "copied",
            FileOutcome::ExcludedBySize => "excluded by size",
            FileOutcome::FailedCopy => "copy failed",
        };
        f.write_str(label)
    }
}

/// Summary of a completed backup run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub directories_total: usize,
    pub directories_processed: usize,
    pub files_copied: usize,
    pub files_copied_as_allowed: usize,
    pub files_excluded: usize,
    pub copy_failures: usize,
    pub big_files: usize,
    pub dataset_folders: usize,
    pub errors: usize,
    /// Number of log documents that could not be written
    pub failed_log_writes: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    /// True when every entry was handled without an error being recorded.
    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.failed_log_writes == 0
    }

    pub fn log(&self) {
        tracing::info!(
            "Backup finished in {}s: {} files copied ({} allow-listed), {} excluded, {} failed",
            self.elapsed.as_secs(),
            self.files_copied + self.files_copied_as_allowed,
            self.files_copied_as_allowed,
            self.files_excluded,
            self.copy_failures
        );
        tracing::info!(
            "Exclusions: {} big files, {} dataset folders, {} errors",
            self.big_files,
            self.dataset_folders,
            self.errors
        );
        if self.failed_log_writes > 0 {
            tracing::error!(
                "{} exclusion log documents could not be written",
                self.failed_log_writes
            );
        }
    }
}
