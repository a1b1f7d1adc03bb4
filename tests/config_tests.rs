//! Configuration resolution tests
//!
//! Note: tests that manipulate GEMINI_API_KEY are marked #[serial] to
//! prevent ENV variable race conditions between parallel tests.

use std::env;
use std::path::PathBuf;

use serial_test::serial;

use trec_report::config::{
    resolve_gemini_api_key, AppConfig, TomlConfig, GEMINI_API_KEY_ENV,
};

#[test]
#[serial]
fn test_gemini_key_from_env() {
    env::set_var(GEMINI_API_KEY_ENV, "env-key-123");

    let key = resolve_gemini_api_key(&TomlConfig::default());
    assert_eq!(key.as_deref(), Some("env-key-123"));

    env::remove_var(GEMINI_API_KEY_ENV);
}

#[test]
#[serial]
fn test_gemini_key_env_beats_toml() {
    env::set_var(GEMINI_API_KEY_ENV, "env-key");
    let toml_config = TomlConfig {
        gemini_api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let key = resolve_gemini_api_key(&toml_config);
    assert_eq!(key.as_deref(), Some("env-key"));

    env::remove_var(GEMINI_API_KEY_ENV);
}

#[test]
#[serial]
fn test_gemini_key_falls_back_to_toml() {
    env::remove_var(GEMINI_API_KEY_ENV);
    let toml_config = TomlConfig {
        gemini_api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let key = resolve_gemini_api_key(&toml_config);
    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_gemini_key_absent() {
    env::remove_var(GEMINI_API_KEY_ENV);
    assert!(resolve_gemini_api_key(&TomlConfig::default()).is_none());
}

#[test]
#[serial]
fn test_gemini_key_blank_env_ignored() {
    env::set_var(GEMINI_API_KEY_ENV, "   ");
    let toml_config = TomlConfig {
        gemini_api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let key = resolve_gemini_api_key(&toml_config);
    assert_eq!(key.as_deref(), Some("toml-key"));

    env::remove_var(GEMINI_API_KEY_ENV);
}

#[test]
fn test_load_missing_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = TomlConfig::load(&dir.path().join("no-such.toml")).unwrap();
    assert!(config.port.is_none());
    assert!(config.gemini_api_key.is_none());
}

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        port = 9191
        output_root = "/var/tmp/reports"
        "#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.port, Some(9191));
    assert_eq!(config.output_root, Some(PathBuf::from("/var/tmp/reports")));
}

#[test]
fn test_load_malformed_config_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
#[serial]
fn test_resolve_full_priority_chain() {
    env::remove_var(GEMINI_API_KEY_ENV);

    let toml_config = TomlConfig {
        port: Some(9090),
        template_dir: Some(PathBuf::from("/toml/latex")),
        output_root: Some(PathBuf::from("/toml/out")),
        download_concurrency: Some(2),
        ..Default::default()
    };

    // CLI beats TOML where given; TOML beats defaults elsewhere
    let config = AppConfig::resolve(
        Some(7070),
        None,
        Some(PathBuf::from("/cli/out")),
        &toml_config,
    );
    assert_eq!(config.port, 7070);
    assert_eq!(config.template_dir, PathBuf::from("/toml/latex"));
    assert_eq!(config.output_root, PathBuf::from("/cli/out"));
    assert_eq!(config.download_concurrency, 2);
    assert!(config.gemini_api_key.is_none());
}
