//! Integration tests for config loading and validation
//!
//! These tests verify the full lifecycle of config operations through TOML
//! parsing from real files, rather than constructing Config structs directly.

use std::fs;
use tempfile::TempDir;

use dacbridge::config::Config;

/// Helper to create a temporary config directory
fn setup_temp_config() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_dir = temp_dir.path().join("dacbridge");
    fs::create_dir_all(&config_dir).expect("Failed to create config dir");
    let config_path = config_dir.join("config.toml");
    (temp_dir, config_path)
}

#[test]
fn test_config_load_full_toml() {
    let (_temp, config_path) = setup_temp_config();

    let toml_content = r#"
[settings]
log_level = "debug"
notify_daemon = false
notify_switch = true

[mixer]
device_name = "Background Music"
bundle_id = "com.bearisdriving.BGM.App"
process_name = "Background Music"

[routing]
dac_candidates = ["SMSL", "SU-1", "USB DAC"]
builtin_candidates = ["MacBook", "Built-in"]
"#;

    fs::write(&config_path, toml_content).expect("Failed to write TOML");

    let loaded = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(loaded.settings.log_level, "debug");
    assert!(!loaded.settings.notify_daemon);
    assert!(loaded.settings.notify_switch);

    assert_eq!(loaded.mixer.device_name, "Background Music");
    assert_eq!(loaded.mixer.bundle_id, "com.bearisdriving.BGM.App");

    assert_eq!(loaded.routing.dac_candidates, vec!["SMSL", "SU-1", "USB DAC"]);
    assert_eq!(loaded.routing.builtin_candidates, vec!["MacBook", "Built-in"]);
}

#[test]
fn test_config_empty_file_loads_defaults() {
    let (_temp, config_path) = setup_temp_config();
    fs::write(&config_path, "").expect("Failed to write TOML");

    let loaded = Config::load_from_path(&config_path).expect("Empty config should load");
    assert_eq!(loaded.mixer.device_name, "Background Music");
    assert_eq!(loaded.settings.log_level, "info");
    assert!(!loaded.routing.dac_candidates.is_empty());
}

#[test]
fn test_config_missing_file_is_an_error() {
    let (_temp, config_path) = setup_temp_config();
    let result = Config::load_from_path(&config_path);
    assert!(result.is_err(), "Loading a missing config should fail");
}

#[test]
fn test_config_malformed_toml_is_an_error() {
    let (_temp, config_path) = setup_temp_config();
    fs::write(&config_path, "[settings\nlog_level = ").expect("Failed to write TOML");

    let result = Config::load_from_path(&config_path);
    assert!(result.is_err(), "Malformed TOML should fail to parse");
}

#[test]
fn test_config_validation_rejects_bad_log_level() {
    let (_temp, config_path) = setup_temp_config();

    let invalid_toml = r#"
[settings]
log_level = "loud"
"#;
    fs::write(&config_path, invalid_toml).expect("Failed to write TOML");

    let result = Config::load_from_path(&config_path);
    assert!(result.is_err());
    let err_msg = format!("{:?}", result.unwrap_err());
    assert!(
        err_msg.contains("log_level"),
        "Error should mention the invalid log_level"
    );
}

#[test]
fn test_config_validation_rejects_empty_candidate_list() {
    let (_temp, config_path) = setup_temp_config();

    let invalid_toml = r#"
[routing]
dac_candidates = []
"#;
    fs::write(&config_path, invalid_toml).expect("Failed to write TOML");

    let result = Config::load_from_path(&config_path);
    assert!(
        result.is_err(),
        "An empty dac_candidates list should fail validation"
    );
}
