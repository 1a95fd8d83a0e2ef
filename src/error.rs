use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Errors raised while classifying, copying, or recording backup entries.
///
/// Every variant carries the path it concerns so the walker can append it to
/// the matching exclusion list without extra bookkeeping.
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Failed to list directory {path}: {source}")]
    Enumeration {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read size of {path}: {source}")]
    Stat {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize document for {path}: {source}")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Path {path} is not under source root {root}")]
    OutsideSourceRoot { path: Utf8PathBuf, root: Utf8PathBuf },

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Backup root {path} could not be created: {source}")]
    BackupRootUnavailable {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BackupError>;
