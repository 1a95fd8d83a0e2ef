//! AutoBackup - selective mirroring with auditable exclusions
//!
//! Main entry point for the command-line application.
//!
//! # Execution Flow
//!
//! 1. Parse command-line arguments
//! 2. Initialize logging → `<log-dir>/autobackup.<date>` plus console
//! 3. Load the YAML settings file (`--config`, or `AutoBackup Settings.yaml`
//!    in the working directory; defaults when absent)
//! 4. Overlay command-line values, optionally save them back
//!    (`--save-settings`), and validate into a [`BackupConfig`]
//! 5. Run the backup walk and report the summary
//!
//! Per-file and per-directory errors never fail the process; they are
//! recorded in `<backup>/log/`. The exit status is non-zero only when the
//! configuration is invalid or the backup root cannot be created.

use anyhow::{Context, Result};
use autobackup::cli::Cli;
use autobackup::{APP_NAME, BackupConfig, BackupWalker, ConfigManager, VERSION};
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until the end of main so buffered file logs are flushed
    let _log_guard = autobackup::logging::setup_logging(&cli.log_dir, APP_NAME, cli.debug, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(cli.settings_path());
    let settings = cli.apply(config_manager.load_settings()?);
    if cli.save_settings {
        config_manager.save_settings(&settings)?;
    }

    let config = BackupConfig::from_settings(&settings).context("Invalid backup configuration")?;
    tracing::info!(
        "Dataset limit: {} files, size limit: {} bytes",
        config.dataset_limit(),
        config.size_limit_bytes()
    );

    let summary = BackupWalker::new(config)
        .run()
        .context("Backup could not start")?;
    summary.log();

    if !summary.is_clean() {
        tracing::warn!("Backup completed with errors; see the log folder under the backup path");
    }

    Ok(())
}
