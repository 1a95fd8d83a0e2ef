//! Settings file model and the validated run configuration.

use crate::error::{BackupError, Result};
use crate::services::path_mapper::normalize;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Resolve a configured root against the working directory and normalize it.
///
/// Roots that are already rooted (`/…` or a drive prefix) are only
/// normalized, so nesting checks compare like with like.
fn absolute_root(path: &Utf8Path) -> Result<Utf8PathBuf> {
    let normalized = normalize(path.as_str());
    if is_rooted(&normalized) {
        return Ok(Utf8PathBuf::from(normalized));
    }

    let resolved = std::path::absolute(&normalized).map_err(|e| {
        BackupError::InvalidConfig(format!("cannot resolve path {}: {}", path, e))
    })?;
    let resolved = Utf8PathBuf::try_from(resolved)
        .map_err(|e| BackupError::NonUtf8Path(e.into_path_buf().to_string_lossy().into_owned()))?;
    Ok(Utf8PathBuf::from(normalize(resolved.as_str())))
}

fn is_rooted(normalized: &str) -> bool {
    let bytes = normalized.as_bytes();
    normalized.starts_with('/')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

/// Bytes per gigabyte as used for the size ceiling (binary gigabyte).
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;

/// Settings as read from the YAML settings file.
///
/// Every field is optional in the file; missing keys fall back to the
/// defaults below. Paths are left unset by default and must come from the
/// file or the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSettings {
    #[serde(default)]
    pub source_path: Option<Utf8PathBuf>,

    #[serde(default)]
    pub backup_path: Option<Utf8PathBuf>,

    /// A directory with more dataset files than this is skipped.
    #[serde(default = "default_dataset_limit_counter")]
    pub dataset_limit_counter: usize,

    /// Files larger than this many gigabytes are replaced by a placeholder.
    #[serde(default = "default_limit_file_size_gb")]
    pub limit_file_size_gb: f64,

    /// Extensions copied regardless of size (model weights, mail stores).
    #[serde(default = "default_must_copy")]
    pub must_copy: IndexSet<String>,

    #[serde(default = "default_dataset_formats")]
    pub dataset_formats: IndexSet<String>,

    #[serde(default = "default_label_formats")]
    pub label_formats: IndexSet<String>,

    /// Directory names that are never mirrored or descended into.
    #[serde(default = "default_pass_dirs")]
    pub pass_dirs: IndexSet<String>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            source_path: None,
            backup_path: None,
            dataset_limit_counter: default_dataset_limit_counter(),
            limit_file_size_gb: default_limit_file_size_gb(),
            must_copy: default_must_copy(),
            dataset_formats: default_dataset_formats(),
            label_formats: default_label_formats(),
            pass_dirs: default_pass_dirs(),
        }
    }
}

fn default_dataset_limit_counter() -> usize {
    100
}

fn default_limit_file_size_gb() -> f64 {
    5.0
}

fn string_set(items: &[&str]) -> IndexSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_must_copy() -> IndexSet<String> {
    string_set(&["pt", "onnx", "rknn", "pst"])
}

fn default_dataset_formats() -> IndexSet<String> {
    string_set(&[
        "jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp", "mp3", "wav",
    ])
}

fn default_label_formats() -> IndexSet<String> {
    string_set(&["json", "txt"])
}

fn default_pass_dirs() -> IndexSet<String> {
    string_set(&[
        ".Trash-1000",
        ".vscode",
        "lost+found",
        "__pycache__",
        "$RECYCLE.BIN",
    ])
}

/// Immutable run configuration.
///
/// Built once at startup, either directly with [`BackupConfig::new`] or from
/// a [`BackupSettings`] with [`BackupConfig::from_settings`]. Both roots are
/// stored absolute and normalized.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    source_root: Utf8PathBuf,
    backup_root: Utf8PathBuf,
    dataset_limit: usize,
    size_limit_bytes: u64,
    always_copy: IndexSet<String>,
    dataset_extensions: IndexSet<String>,
    skip_dir_names: IndexSet<String>,
}

impl BackupConfig {
    /// Create a configuration with the default extension and skip sets.
    ///
    /// # Arguments
    /// * `source_root` - Tree to back up
    /// * `backup_root` - Destination of the mirror
    /// * `dataset_limit` - Dataset file count above which a folder is skipped
    /// * `limit_gb` - Size ceiling in gigabytes (converted with ×1024³)
    pub fn new(
        source_root: impl AsRef<Utf8Path>,
        backup_root: impl AsRef<Utf8Path>,
        dataset_limit: usize,
        limit_gb: f64,
    ) -> Result<Self> {
        let settings = BackupSettings {
            source_path: Some(source_root.as_ref().to_path_buf()),
            backup_path: Some(backup_root.as_ref().to_path_buf()),
            dataset_limit_counter: dataset_limit,
            limit_file_size_gb: limit_gb,
            ..BackupSettings::default()
        };
        Self::from_settings(&settings)
    }

    /// Validate settings and build the run configuration.
    pub fn from_settings(settings: &BackupSettings) -> Result<Self> {
        let source = settings
            .source_path
            .as_ref()
            .filter(|p| !p.as_str().is_empty())
            .ok_or_else(|| BackupError::InvalidConfig("source path is not set".to_string()))?;
        let backup = settings
            .backup_path
            .as_ref()
            .filter(|p| !p.as_str().is_empty())
            .ok_or_else(|| BackupError::InvalidConfig("backup path is not set".to_string()))?;

        let limit_gb = settings.limit_file_size_gb;
        if !limit_gb.is_finite() || limit_gb < 0.0 {
            return Err(BackupError::InvalidConfig(format!(
                "file size limit must be a non-negative number of GB, got {}",
                limit_gb
            )));
        }

        let source_root = absolute_root(source)?;
        let backup_root = absolute_root(backup)?;
        if source_root == backup_root {
            return Err(BackupError::InvalidConfig(format!(
                "source and backup paths are the same: {}",
                source_root
            )));
        }

        let dataset_extensions = settings
            .dataset_formats
            .union(&settings.label_formats)
            .cloned()
            .collect();

        Ok(Self {
            source_root,
            backup_root,
            dataset_limit: settings.dataset_limit_counter,
            size_limit_bytes: (limit_gb * BYTES_PER_GB as f64) as u64,
            always_copy: settings.must_copy.clone(),
            dataset_extensions,
            skip_dir_names: settings.pass_dirs.clone(),
        })
    }

    /// Override the size ceiling with an exact byte count.
    pub fn with_size_limit_bytes(mut self, bytes: u64) -> Self {
        self.size_limit_bytes = bytes;
        self
    }

    pub fn source_root(&self) -> &Utf8Path {
        &self.source_root
    }

    pub fn backup_root(&self) -> &Utf8Path {
        &self.backup_root
    }

    pub fn dataset_limit(&self) -> usize {
        self.dataset_limit
    }

    pub fn size_limit_bytes(&self) -> u64 {
        self.size_limit_bytes
    }

    pub fn is_always_copy_extension(&self, extension: &str) -> bool {
        self.always_copy.contains(extension)
    }

    pub fn is_dataset_extension(&self, extension: &str) -> bool {
        self.dataset_extensions.contains(extension)
    }

    pub fn is_skipped_dir_name(&self, name: &str) -> bool {
        self.skip_dir_names.contains(name)
    }
}
