use clap::Parser;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use rustgallery::cli::Cli;
use rustgallery::config::{Config, ENV_PREFIX};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert!(config.open_browser);
    assert!(!config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert_eq!(config.cache_dir, None);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
cache_dir = "/var/cache/gallery"
open_browser = false
skip_hidden = true
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/gallery")));
    assert!(!config.open_browser);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_missing_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(result.is_err());
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "open_browser = \"sometimes\"").unwrap();

    assert!(Config::load(Some(&config_path)).is_err());
}

#[test]
fn test_config_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "static_dir = \"/from/file\"").unwrap();

    let var = format!("{}STATIC_DIR", ENV_PREFIX);
    std::env::set_var(&var, "/from/env");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed(ENV_PREFIX).only(&["static_dir"]))
        .extract()
        .unwrap();

    std::env::remove_var(&var);

    assert_eq!(config.static_dir, Some(PathBuf::from("/from/env")));
}

#[test]
fn test_config_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        "cache_dir = \"/from/file\"\nopen_browser = true\n",
    )
    .unwrap();

    let mut config = Config::load(Some(&config_path)).unwrap();
    let cli = Cli::try_parse_from([
        "rustgallery",
        "/photos",
        "--cache-dir",
        "/from/cli",
        "--no-open",
        "--follow-symlinks",
    ])
    .unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.resolved_cache_dir(), PathBuf::from("/from/cli"));
    assert!(!config.open_browser);
    assert!(config.follow_symlinks);
}

#[test]
fn test_config_resolved_static_dir_ships_stylesheet() {
    let config = Config::default();
    assert!(config.resolved_static_dir().join("gallery.css").is_file());
}
