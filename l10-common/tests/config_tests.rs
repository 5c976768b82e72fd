//! Tests for configuration loading and root folder resolution
//!
//! Uses serial_test: tests that manipulate L10_ROOT_FOLDER are marked
//! #[serial] so they never run in parallel with each other.

use l10_common::config::{
    default_root_folder, RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use l10_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_env_var_beats_config_file() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/l10-test-env-folder");

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/l10-from-config")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_config(&config)
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/l10-test-env-folder"));
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_beats_env_var() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/l10-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/l10-from-cli")))
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/l10-from-cli"));
    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_config_file_used_without_env() {
    env::remove_var(ROOT_FOLDER_ENV);

    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/l10-from-config")),
        ..TomlConfig::default()
    };
    let root_folder = RootFolderResolver::new("test-module")
        .with_config(&config)
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/l10-from-config"));
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        root_folder = "/srv/l10"

        [pace]
        critical_pct = 25.0

        [cleanup]
        stale_after_hours = 4
        "#,
    )
    .unwrap();

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/l10")));
    assert_eq!(config.pace.critical_pct, 25.0);
    assert_eq!(config.cleanup.stale_after_hours, 4);
    assert_eq!(config.cleanup.interval_minutes, 60);
}

#[test]
fn test_load_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let result = TomlConfig::load(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_malformed_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "pace = [not toml").unwrap();

    let result = TomlConfig::load(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_initializer_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("root");
    assert!(!root.exists());

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("l10.db"));
}
