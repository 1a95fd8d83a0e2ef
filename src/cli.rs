//! Command-line interface.
//!
//! Command-line values take precedence over the settings file, which in turn
//! takes precedence over the built-in defaults.

use crate::config::DEFAULT_SETTINGS_FILE;
use crate::models::BackupSettings;
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "autobackup",
    version,
    about = "Mirror a directory tree, skipping oversized files and dataset folders"
)]
pub struct Cli {
    /// Directory to back up
    pub source: Option<Utf8PathBuf>,

    /// Directory that receives the mirror
    pub backup: Option<Utf8PathBuf>,

    /// Skip folders holding more than this many dataset files
    #[arg(long)]
    pub dataset_limit: Option<usize>,

    /// Skip files larger than this many gigabytes
    #[arg(long)]
    pub limit_gb: Option<f64>,

    /// YAML settings file [default: "AutoBackup Settings.yaml" in the working directory]
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Write the effective settings back to the settings file before running
    #[arg(long)]
    pub save_settings: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Directory for application log files
    #[arg(long, default_value = "logs")]
    pub log_dir: Utf8PathBuf,
}

impl Cli {
    /// Settings file to load: `--config` if given, else the default file name.
    pub fn settings_path(&self) -> Utf8PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Overlay the values given on the command line onto `settings`.
    pub fn apply(&self, mut settings: BackupSettings) -> BackupSettings {
        if let Some(source) = &self.source {
            settings.source_path = Some(source.clone());
        }
        if let Some(backup) = &self.backup {
            settings.backup_path = Some(backup.clone());
        }
        if let Some(limit) = self.dataset_limit {
            settings.dataset_limit_counter = limit;
        }
        if let Some(gb) = self.limit_gb {
            settings.limit_file_size_gb = gb;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_and_flags() {
        let cli = Cli::try_parse_from([
            "autobackup",
            "/data/work",
            "/mnt/backup",
            "--dataset-limit",
            "300",
            "--limit-gb",
            "2.5",
        ])
        .unwrap();

        assert_eq!(cli.source, Some(Utf8PathBuf::from("/data/work")));
        assert_eq!(cli.dataset_limit, Some(300));
        assert_eq!(cli.log_dir, "logs");
        assert!(!cli.debug);
        assert!(!cli.save_settings);
    }

    #[test]
    fn test_settings_path_defaults_to_working_directory_file() {
        let cli = Cli::try_parse_from(["autobackup"]).unwrap();
        assert_eq!(cli.settings_path(), Utf8PathBuf::from(DEFAULT_SETTINGS_FILE));

        let cli = Cli::try_parse_from(["autobackup", "-c", "/etc/backup.yaml"]).unwrap();
        assert_eq!(cli.settings_path(), Utf8PathBuf::from("/etc/backup.yaml"));
    }

    #[test]
    fn test_apply_overrides_only_given_values() {
        let cli = Cli::try_parse_from(["autobackup", "--limit-gb", "0.5"]).unwrap();

        let base = BackupSettings {
            source_path: Some(Utf8PathBuf::from("/from/file")),
            dataset_limit_counter: 42,
            ..BackupSettings::default()
        };
        let merged = cli.apply(base);

        assert_eq!(merged.source_path, Some(Utf8PathBuf::from("/from/file")));
        assert_eq!(merged.dataset_limit_counter, 42);
        assert_eq!(merged.limit_file_size_gb, 0.5);
    }
}
