//! Data models for the backup run.
//!
//! - [`BackupSettings`]: Settings as loaded from the YAML settings file
//! - [`BackupConfig`]: Validated, immutable run configuration
//! - [`ExclusionLists`]: Exclusions and errors accumulated during one run
//! - [`DirOutcome`] / [`FileOutcome`]: Per-entry decisions of the copy pass
//! - [`RunSummary`]: Counts and timing reported when a run completes

pub mod config;
pub mod exclusion;
pub mod outcome;

pub use config::{BackupConfig, BackupSettings};
pub use exclusion::{BigFilePlaceholder, ErrorEntry, ExclusionList, ExclusionLists};
pub use outcome::{DirOutcome, FileOutcome, RunSummary};
