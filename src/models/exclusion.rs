//! Exclusion lists and the placeholder documents left in the backup tree.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// Marker appended to every generated placeholder file name.
pub const SIGNATURE: &str = "[[자동백업제외]]";

/// Name of the directory under the backup root that receives the run logs.
pub const LOG_DIR_NAME: &str = "log";

/// File name of the placeholder written into a skipped dataset folder.
pub fn dataset_placeholder_name() -> String {
    format!("dataset_path{}.json", SIGNATURE)
}

/// Placeholder path for an oversized file.
///
/// `mapped_file` is the file's mapped backup path; the size is appended to
/// it, e.g. `movie.mkv_[12.5]gb_big_file[[자동백업제외]].json`.
pub fn big_file_placeholder_path(mapped_file: &Utf8Path, size_gb: f64) -> Utf8PathBuf {
    Utf8PathBuf::from(format!(
        "{}_[{}]gb_big_file{}.json",
        mapped_file,
        format_gb(size_gb),
        SIGNATURE
    ))
}

/// Convert a byte count to gigabytes rounded to two decimals.
pub fn bytes_to_gb(bytes: u64) -> f64 {
    let gb = bytes as f64 / super::config::BYTES_PER_GB as f64;
    (gb * 100.0).round() / 100.0
}

/// Render a gigabyte value the way it appears in placeholder names.
///
/// Whole numbers keep one decimal (`2.0`), others print their shortest form
/// (`1.5`, `12.34`).
pub fn format_gb(size_gb: f64) -> String {
    let text = size_gb.to_string();
    if text.contains('.') || !size_gb.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Document stored in place of an oversized file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigFilePlaceholder {
    #[serde(rename = "경로")]
    pub path: String,

    #[serde(rename = "용량(GB)")]
    pub size_gb: f64,
}

/// A path paired with the description of the error it raised.
///
/// Serialized as a two-element array `[path, message]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry(pub String, pub String);

impl ErrorEntry {
    pub fn new(path: &Utf8Path, message: impl ToString) -> Self {
        Self(path.to_string(), message.to_string())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn message(&self) -> &str {
        &self.1
    }
}

/// Identifies one of the five exclusion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusionList {
    BigFiles,
    FileSizeErrors,
    DatasetFolders,
    DatasetErrors,
    CopyErrors,
}

impl ExclusionList {
    /// All lists, in the order they are flushed.
    pub const ALL: [ExclusionList; 5] = [
        ExclusionList::BigFiles,
        ExclusionList::FileSizeErrors,
        ExclusionList::DatasetFolders,
        ExclusionList::DatasetErrors,
        ExclusionList::CopyErrors,
    ];

    /// Base name of the log document (without `.json`).
    pub fn log_name(self) -> &'static str {
        match self {
            ExclusionList::BigFiles => "big_file_list",
            ExclusionList::FileSizeErrors => "is_file_big_error_list",
            ExclusionList::DatasetFolders => "dataset_folder_list",
            ExclusionList::DatasetErrors => "is_dataset_error_list",
            ExclusionList::CopyErrors => "auto_backup_error_list",
        }
    }

    pub fn log_file_name(self) -> String {
        format!("{}.json", self.log_name())
    }
}

/// Exclusions and errors accumulated during one run, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionLists {
    pub big_files: Vec<String>,
    pub file_size_errors: Vec<ErrorEntry>,
    pub dataset_folders: Vec<String>,
    pub dataset_errors: Vec<ErrorEntry>,
    pub copy_errors: Vec<ErrorEntry>,
}

impl ExclusionLists {
    pub fn len_of(&self, list: ExclusionList) -> usize {
        match list {
            ExclusionList::BigFiles => self.big_files.len(),
            ExclusionList::FileSizeErrors => self.file_size_errors.len(),
            ExclusionList::DatasetFolders => self.dataset_folders.len(),
            ExclusionList::DatasetErrors => self.dataset_errors.len(),
            ExclusionList::CopyErrors => self.copy_errors.len(),
        }
    }

    /// Total number of recorded errors across the three error lists.
    pub fn error_count(&self) -> usize {
        self.file_size_errors.len() + self.dataset_errors.len() + self.copy_errors.len()
    }

    /// JSON value of a single list, as written to its log document.
    pub fn document(&self, list: ExclusionList) -> serde_json::Value {
        let value = match list {
            ExclusionList::BigFiles => serde_json::to_value(&self.big_files),
            ExclusionList::FileSizeErrors => serde_json::to_value(&self.file_size_errors),
            ExclusionList::DatasetFolders => serde_json::to_value(&self.dataset_folders),
            ExclusionList::DatasetErrors => serde_json::to_value(&self.dataset_errors),
            ExclusionList::CopyErrors => serde_json::to_value(&self.copy_errors),
        };
        // Strings and string pairs always serialize.
        value.unwrap_or(serde_json::Value::Array(Vec::new()))
    }
}
