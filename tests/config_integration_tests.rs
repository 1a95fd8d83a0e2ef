//! Integration tests for ConfigManager and settings handling
//!
//! These tests verify:
//! - Settings loading and saving
//! - Defaults for keys missing from the YAML file
//! - Conversion of settings into a validated BackupConfig
//! - Command-line values overriding file values

use autobackup::cli::Cli;
use autobackup::{BackupConfig, BackupError, BackupSettings, ConfigManager};
use camino::Utf8PathBuf;
use clap::Parser;
use std::fs;
use tempfile::TempDir;

fn create_test_settings_path() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, dir.join("settings.yaml"))
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let (_temp_dir, path) = create_test_settings_path();
    fs::write(
        &path,
        "source_path: /data/work\nbackup_path: /mnt/backup\ndataset_limit_counter: 500\n",
    )
    .unwrap();

    let settings = ConfigManager::new(&path).load_settings().unwrap();

    assert_eq!(settings.source_path, Some(Utf8PathBuf::from("/data/work")));
    assert_eq!(settings.dataset_limit_counter, 500);
    assert_eq!(settings.limit_file_size_gb, 5.0);
    assert!(settings.must_copy.contains("pt"));
    assert!(settings.pass_dirs.contains("$RECYCLE.BIN"));
}

#[test]
fn test_custom_extension_sets() {
    let (_temp_dir, path) = create_test_settings_path();
    fs::write(
        &path,
        "\
source_path: /data/work
backup_path: /mnt/backup
limit_file_size_gb: 0.25
must_copy: [ckpt]
dataset_formats: [tif]
label_formats: [xml]
pass_dirs: [node_modules]
",
    )
    .unwrap();

    let settings = ConfigManager::new(&path).load_settings().unwrap();
    let config = BackupConfig::from_settings(&settings).unwrap();

    assert_eq!(config.size_limit_bytes(), 268_435_456);
    assert!(config.is_always_copy_extension("ckpt"));
    assert!(!config.is_always_copy_extension("pt"));
    assert!(config.is_dataset_extension("tif"));
    assert!(config.is_dataset_extension("xml"));
    assert!(!config.is_dataset_extension("jpg"));
    assert!(config.is_skipped_dir_name("node_modules"));
    assert!(!config.is_skipped_dir_name(".vscode"));
}

#[test]
fn test_save_and_reload_round_trip() {
    let (_temp_dir, path) = create_test_settings_path();
    let manager = ConfigManager::new(&path);

    let mut settings = BackupSettings::default();
    settings.backup_path = Some(Utf8PathBuf::from("E:/백업"));
    settings.limit_file_size_gb = 1.5;
    manager.save_settings(&settings).unwrap();

    assert_eq!(manager.load_settings().unwrap(), settings);
}

#[test]
fn test_settings_without_paths_are_invalid() {
    let settings = BackupSettings::default();
    let result = BackupConfig::from_settings(&settings);
    assert!(matches!(result, Err(BackupError::InvalidConfig(_))));
}

#[test]
fn test_cli_overrides_file_settings() {
    let (_temp_dir, path) = create_test_settings_path();
    fs::write(
        &path,
        "source_path: /from/file\nbackup_path: /backup/from/file\nlimit_file_size_gb: 9\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "autobackup",
        "/from/cli",
        "--config",
        path.as_str(),
        "--dataset-limit",
        "7",
    ])
    .unwrap();

    let settings = cli.apply(ConfigManager::new(&path).load_settings().unwrap());
    let config = BackupConfig::from_settings(&settings).unwrap();

    assert_eq!(config.source_root().as_str(), "/from/cli");
    assert_eq!(config.backup_root().as_str(), "/backup/from/file");
    assert_eq!(config.dataset_limit(), 7);
    assert_eq!(config.size_limit_bytes(), 9 * 1024 * 1024 * 1024);
}

#[test]
fn test_save_settings_persists_cli_values() {
    let (_temp_dir, path) = create_test_settings_path();

    let cli = Cli::try_parse_from([
        "autobackup",
        "/data/work",
        "/mnt/backup",
        "--config",
        path.as_str(),
        "--limit-gb",
        "2",
        "--save-settings",
    ])
    .unwrap();

    let manager = ConfigManager::new(cli.settings_path());
    let settings = cli.apply(manager.load_settings().unwrap());
    assert!(cli.save_settings);
    manager.save_settings(&settings).unwrap();

    let reloaded = ConfigManager::new(&path).load_settings().unwrap();
    assert_eq!(reloaded.source_path, Some(Utf8PathBuf::from("/data/work")));
    assert_eq!(reloaded.backup_path, Some(Utf8PathBuf::from("/mnt/backup")));
    assert_eq!(reloaded.limit_file_size_gb, 2.0);
    assert_eq!(reloaded.dataset_limit_counter, 100);
}
