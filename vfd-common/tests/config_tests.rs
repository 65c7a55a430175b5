//! Integration tests for config file resolution and graceful degradation
//!
//! - Missing config files SHALL NOT cause termination (warning + defaults)
//! - Priority order: CLI argument > VFD_CONFIG > platform file > defaults
//! - Malformed files are reported, not silently ignored
//!
//! Tests touching VFD_CONFIG are marked #[serial] to avoid ENV races.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use vfd_common::config::{ConfigResolver, RandomSourceConfig, TomlConfig, CONFIG_ENV_VAR};
use vfd_common::Error;

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    let temp_dir = TempDir::new().unwrap();
    let cli = write_config(&temp_dir, "cli.toml", "[scoring]\nfraud_threshold = 0.8\n");
    let env_path = write_config(&temp_dir, "env.toml", "[scoring]\nfraud_threshold = 0.2\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let resolver = ConfigResolver::new(Some(cli.clone()));
    assert_eq!(resolver.resolve(), Some(cli));

    let config = resolver.load().unwrap();
    assert_eq!(config.scoring.fraud_threshold, 0.8);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_argument() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = write_config(
        &temp_dir,
        "env.toml",
        "[scoring.random]\nmode = \"seeded\"\nseed = 1234\n",
    );
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = ConfigResolver::new(None).load().unwrap();
    assert_eq!(config.scoring.random, RandomSourceConfig::Seeded { seed: 1234 });

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = ConfigResolver::new(Some(missing)).load().unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let bad = write_config(&temp_dir, "bad.toml", "[analysis]\nhop_size = \"lots\"\n");

    let result = ConfigResolver::new(Some(bad)).load();
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_values_are_rejected_on_load() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let bad = write_config(&temp_dir, "invalid.toml", "[analysis]\nhop_size = 0\n");

    let result = ConfigResolver::new(Some(bad)).load();
    let err = result.unwrap_err().to_string();
    assert!(err.contains("hop_size"), "unexpected error: {}", err);
}

#[test]
fn test_full_document_parses() {
    let config = TomlConfig::from_toml_str(
        r#"
        [logging]
        level = "vfd_analyzer=debug"

        [analysis]
        target_sample_rate = 22050
        fft_size = 2048
        hop_size = 512
        n_mels = 64

        [language]
        telugu_above_hz = 2100.0
        malayalam_above_hz = 1900.0
        hindi_above_hz = 1650.0

        [scoring]
        robotic_mfcc_threshold = 20.0
        variance_threshold = 4.0

        [scoring.random]
        mode = "fixed"
        value = 0.25
        "#,
    )
    .unwrap();

    assert_eq!(config.logging.level, "vfd_analyzer=debug");
    assert_eq!(config.analysis.n_mels, 64);
    assert_eq!(config.language.hindi_above_hz, 1650.0);
    assert_eq!(config.scoring.robotic_mfcc_threshold, 20.0);
    assert_eq!(config.scoring.random, RandomSourceConfig::Fixed { value: 0.25 });
}
