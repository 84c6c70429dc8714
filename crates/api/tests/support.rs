//! Shared context builder for the command integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use jimpitan_app::AppContext;
use jimpitan_domain::{CollectionConfig, Config, DatabaseConfig};
use tempfile::TempDir;

/// Built app context plus the directory keeping its database alive.
pub struct TestContext {
    pub ctx: Arc<AppContext>,
    _temp_dir: TempDir,
}

/// Config over a temporary database with a deliberately small roster:
/// two donors in `kategori1`, one in `kategori2`, so completeness gates
/// trip after a single missing entry. Background services are disabled;
/// drain tests trigger the engine by hand.
pub fn test_config(db_path: &Path) -> Config {
    let mut rosters = BTreeMap::new();
    rosters.insert("kategori1".to_string(), vec!["Amat".to_string(), "Dani".to_string()]);
    rosters.insert("kategori2".to_string(), vec!["Pak A".to_string()]);

    let mut labels = BTreeMap::new();
    labels.insert("kategori1".to_string(), "RT Tengah".to_string());
    labels.insert("kategori2".to_string(), "RT Kulon".to_string());

    let mut config = Config {
        database: DatabaseConfig { path: db_path.to_string_lossy().to_string(), pool_size: 4 },
        collection: CollectionConfig {
            timezone: "Asia/Jakarta".to_string(),
            rosters,
            labels,
        },
        ..Config::default()
    };
    config.sync.enabled = false;
    config.retention.enabled = false;
    config
}

/// Create a fresh app context over a temporary database.
pub async fn setup_test_context() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("failed to create temporary test directory");
    let config = test_config(&temp_dir.path().join("jimpitan.db"));

    let ctx =
        AppContext::new_with_config(config).await.expect("failed to create test context");

    TestContext { ctx: Arc::new(ctx), _temp_dir: temp_dir }
}

/// Same as [`setup_test_context`] but with the upload endpoint pointed
/// at a mock server.
pub async fn setup_test_context_with_upload_url(url: &str) -> TestContext {
    let temp_dir = tempfile::tempdir().expect("failed to create temporary test directory");
    let mut config = test_config(&temp_dir.path().join("jimpitan.db"));
    config.upload.url = url.to_string();

    let ctx =
        AppContext::new_with_config(config).await.expect("failed to create test context");

    TestContext { ctx: Arc::new(ctx), _temp_dir: temp_dir }
}
