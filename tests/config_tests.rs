// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use barcode_scanner::Config;
use barcode_scanner::constants::detection;
use std::time::Duration;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(!config.mirror_preview);
    assert!(!config.suppress_repeats, "Repeats are reported by default");
    assert!(config.last_camera_path.is_none());
    assert_eq!(
        config.decode_interval(),
        Duration::from_millis(detection::DEFAULT_DECODE_INTERVAL_MS)
    );
    assert!(
        !config.settings_commands.is_empty(),
        "Settings fallbacks should not be empty"
    );
}

#[test]
fn test_config_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let config = Config {
        last_camera_path: Some("42".to_string()),
        suppress_repeats: true,
        settings_uri: Some("settings://privacy/camera".to_string()),
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.last_camera_path.as_deref(), Some("42"));
    assert!(loaded.suppress_repeats);
    assert_eq!(
        loaded.settings_uri.as_deref(),
        Some("settings://privacy/camera")
    );
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = Config::load_from(&dir.path().join("absent.json")).unwrap();
    assert!(loaded.last_camera_path.is_none());
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(Config::load_from(&path).is_err());
}

#[test]
fn test_zero_values_are_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "detector_max_dimension": 0, "frame_channel_capacity": 0 }"#,
    )
    .unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.detector_max_dimension, detection::DEFAULT_MAX_DIMENSION);
    assert!(loaded.frame_channel_capacity > 0);
}
