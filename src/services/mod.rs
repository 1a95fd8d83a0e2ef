//! Services module - the classification-and-copy walk.
//!
//! # Components
//!
//! - [`PathMapper`]: Maps source paths onto the backup tree and normalizes
//!   separators so every path in logs and comparisons has one form.
//! - [`Classifier`]: Exclusion policy. Detects dataset folders (too many
//!   media/label files), oversized files, and always-copy extensions.
//! - [`ExclusionRecorder`]: Writes placeholder documents and accumulates the
//!   five exclusion lists that are flushed to `<backup>/log/` after the run.
//! - [`BackupWalker`]: Two-pass traversal (mirror directories, then copy),
//!   progress reporting, and the final [`RunSummary`](crate::models::RunSummary).
//!
//! # Usage
//!
//! ```ignore
//! use autobackup::models::BackupConfig;
//! use autobackup::services::BackupWalker;
//!
//! let config = BackupConfig::new("/data/work", "/mnt/backup/work", 500, 4.0)?;
//! let summary = BackupWalker::new(config).run()?;
//! summary.log();
//! ```
//!
//! # Placeholders
//!
//! Excluded content is never silently dropped. A skipped dataset folder gets
//! `dataset_path[[자동백업제외]].json` listing the qualifying file names, and
//! an oversized file gets `<name>_[<GB>]gb_big_file[[자동백업제외]].json`
//! with its original path and size.

pub mod classifier;
pub mod fsops;
pub mod path_mapper;
pub mod recorder;
pub mod throttle;
pub mod walker;

pub use classifier::Classifier;
pub use path_mapper::{PathMapper, normalize};
pub use recorder::ExclusionRecorder;
pub use walker::BackupWalker;
