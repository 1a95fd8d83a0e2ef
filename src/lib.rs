// AutoBackup - selective mirroring with auditable exclusions
//
// This is the library crate containing the classification-and-copy walk.
// The binary crate (main.rs) provides the command-line entry point.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use error::BackupError;
pub use models::{BackupConfig, BackupSettings, RunSummary};
pub use services::BackupWalker;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
