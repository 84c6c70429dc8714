//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use jimpitan_infra::config;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_json_file() {
    // Create a temporary JSON config file
    let json_content = r#"{
        "database": {
            "path": "/tmp/integration_test.db",
            "pool_size": 10
        },
        "upload": {
            "url": "https://example.test/upload",
            "direct_timeout_secs": 20,
            "queue_item_timeout_secs": 8
        },
        "sync": {
            "interval_seconds": 30,
            "enabled": true
        },
        "retention": {
            "interval_seconds": 7200,
            "enabled": true,
            "synced_max_age_days": 14,
            "queue_max_age_days": 3
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    // Load configuration from the file
    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from JSON file");

    let config = result.unwrap();

    // Verify database configuration
    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert_eq!(config.database.pool_size, 10);

    // Verify upload configuration
    assert_eq!(config.upload.url, "https://example.test/upload");
    assert_eq!(config.upload.direct_timeout_secs, 20);
    assert_eq!(config.upload.queue_item_timeout_secs, 8);

    // Verify sync configuration
    assert_eq!(config.sync.interval_seconds, 30);
    assert!(config.sync.enabled);

    // Verify retention configuration
    assert_eq!(config.retention.synced_max_age_days, 14);
    assert_eq!(config.retention.queue_max_age_days, 3);

    // Collection section was omitted, so the built-in rosters apply
    assert!(config.collection.roster("kategori1").is_some());

    // Cleanup
    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    // Create a temporary TOML config file
    let toml_content = r#"
[database]
path = "/tmp/integration_test_toml.db"
pool_size = 8

[upload]
url = "https://example.test/toml-upload"
direct_timeout_secs = 15
queue_item_timeout_secs = 10

[sync]
interval_seconds = 20
enabled = false

[collection]
timezone = "Asia/Makassar"

[collection.rosters]
kategori1 = ["Amat", "Dani", "Idek"]

[collection.labels]
kategori1 = "RT Tengah"
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from TOML file");

    let config = result.unwrap();

    assert_eq!(config.database.path, "/tmp/integration_test_toml.db");
    assert_eq!(config.database.pool_size, 8);
    assert_eq!(config.upload.url, "https://example.test/toml-upload");
    assert!(!config.sync.enabled);

    assert_eq!(config.collection.timezone, "Asia/Makassar");
    let roster = config.collection.roster("kategori1").expect("roster should parse");
    assert_eq!(roster, ["Amat", "Dani", "Idek"]);
    assert_eq!(config.collection.label("kategori1"), "RT Tengah");

    // Cleanup
    std::fs::remove_file(path).ok();
}

#[test]
fn test_minimal_config_file_gets_full_defaults() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(b"{}").expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("empty config should load");

    assert_eq!(config.database.path, "jimpitan.db");
    assert_eq!(config.upload.direct_timeout_secs, 15);
    assert_eq!(config.upload.queue_item_timeout_secs, 10);
    assert_eq!(config.retention.synced_max_age_days, 30);
    assert_eq!(config.retention.queue_max_age_days, 7);
    assert_eq!(config.collection.timezone, "Asia/Jakarta");

    // Cleanup
    std::fs::remove_file(path).ok();
}
