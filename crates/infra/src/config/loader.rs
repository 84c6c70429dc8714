//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. If no file exists either, uses the built-in defaults
//! 4. Supports JSON and TOML formats
//!
//! Every section of [`Config`] is individually defaulted, so a config
//! file only needs to spell out what it overrides.
//!
//! ## Environment Variables
//! - `JIMPITAN_DB_PATH`: Database file path
//! - `JIMPITAN_DB_POOL_SIZE`: Connection pool size
//! - `JIMPITAN_SYNC_INTERVAL`: Sync interval in seconds
//! - `JIMPITAN_SYNC_ENABLED`: Whether background sync is enabled (true/false)
//! - `JIMPITAN_UPLOAD_URL`: Upload endpoint override
//! - `JIMPITAN_TIMEZONE`: Collection day timezone override
//! - `JIMPITAN_ROSTERS`: Inline JSON map of category id to donor roster
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./jimpitan.json` or `./jimpitan.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use jimpitan_domain::{
    CollectionConfig, Config, DatabaseConfig, JimpitanError, Result, RetentionConfig, SyncConfig,
    UploadConfig,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to a config file; when no file is
/// found either, the built-in defaults apply.
///
/// # Errors
/// Returns `JimpitanError::Config` if:
/// - Environment values are present but invalid
/// - A config file exists but cannot be parsed
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            match probe_config_paths() {
                Some(path) => load_from_file(Some(path)),
                None => {
                    tracing::info!("No config file found, using built-in defaults");
                    Ok(Config::default())
                }
            }
        }
    }
}

/// Load configuration from environment variables
///
/// The database path, pool size, and sync interval must be present;
/// everything else falls back to defaults.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `JimpitanError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("JIMPITAN_DB_PATH")?;
    let db_pool_size = env_var("JIMPITAN_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| JimpitanError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let sync_interval = env_var("JIMPITAN_SYNC_INTERVAL").and_then(|s| {
        s.parse::<u64>().map_err(|e| JimpitanError::Config(format!("Invalid sync interval: {}", e)))
    })?;
    let sync_enabled = env_bool("JIMPITAN_SYNC_ENABLED", true);

    let mut upload = UploadConfig::default();
    if let Ok(url) = std::env::var("JIMPITAN_UPLOAD_URL") {
        upload.url = url;
    }

    let mut collection = CollectionConfig::default();
    if let Ok(timezone) = std::env::var("JIMPITAN_TIMEZONE") {
        collection.timezone = timezone;
    }
    if let Ok(rosters) = std::env::var("JIMPITAN_ROSTERS") {
        collection.rosters = serde_json::from_str(&rosters)
            .map_err(|e| JimpitanError::Config(format!("Invalid rosters JSON: {}", e)))?;
    }

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        upload,
        sync: SyncConfig { interval_seconds: sync_interval, enabled: sync_enabled },
        retention: RetentionConfig::default(),
        collection,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `JimpitanError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(JimpitanError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            JimpitanError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| JimpitanError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `JimpitanError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| JimpitanError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| JimpitanError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(JimpitanError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches for config files in the following locations (in order):
/// 1. Current working directory (`./config.{json,toml}`,
///    `./jimpitan.{json,toml}`)
/// 2. Parent directories (up to 2 levels)
/// 3. Relative to executable location
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Try current working directory
    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("jimpitan.json"),
            cwd.join("jimpitan.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    // Try relative to executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("jimpitan.json"),
                exe_dir.join("jimpitan.toml"),
                exe_dir.join("../config.json"),
                exe_dir.join("../config.toml"),
                exe_dir.join("../../config.json"),
                exe_dir.join("../../config.toml"),
            ]);
        }
    }

    // Return first existing candidate
    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `JimpitanError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        JimpitanError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Arguments
/// * `key` - Environment variable name
/// * `default` - Default value if variable is not set
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
