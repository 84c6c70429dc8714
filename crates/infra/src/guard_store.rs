//! File-backed store for the daily-upload guard.
//!
//! The guard map (category to last-upload day) lives in a small JSON
//! sidecar next to the database, outside the main store. A missing or
//! unparseable file reads as an empty map, so a damaged sidecar degrades
//! to "nothing uploaded yet" instead of blocking every submit.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jimpitan_core::GuardStore;
use jimpitan_domain::constants::GUARD_FILE_NAME;
use jimpitan_domain::{JimpitanError, Result as DomainResult};
use tokio::task;
use tracing::warn;

use crate::errors::map_join_error;

/// JSON-file guard store.
pub struct FileGuardStore {
    path: PathBuf,
}

impl FileGuardStore {
    /// Use an explicit file path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Place the sidecar in the same directory as the database file.
    pub fn beside_database<P: AsRef<Path>>(db_path: P) -> Self {
        let dir = db_path.as_ref().parent().unwrap_or_else(|| Path::new("."));
        Self::new(dir.join(GUARD_FILE_NAME))
    }

    /// The sidecar file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(path: &Path) -> DomainResult<BTreeMap<String, String>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(JimpitanError::ReadFailed(format!("guard file unreadable: {err}")))
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "guard file corrupt, starting fresh");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(path: &Path, map: &BTreeMap<String, String>) -> DomainResult<()> {
        let raw = serde_json::to_string(map)
            .map_err(|e| JimpitanError::Internal(format!("guard map not serializable: {e}")))?;
        std::fs::write(path, raw)
            .map_err(|e| JimpitanError::WriteFailed(format!("guard file unwritable: {e}")))
    }
}

#[async_trait]
impl GuardStore for FileGuardStore {
    async fn get_last_upload_day(&self, category: &str) -> DomainResult<Option<String>> {
        let path = self.path.clone();
        let category = category.to_owned();

        task::spawn_blocking(move || -> DomainResult<Option<String>> {
            let map = Self::read_map(&path)?;
            Ok(map.get(&category).cloned())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn set_last_upload_day(&self, category: &str, day: &str) -> DomainResult<()> {
        let path = self.path.clone();
        let category = category.to_owned();
        let day = day.to_owned();

        task::spawn_blocking(move || -> DomainResult<()> {
            let mut map = Self::read_map(&path)?;
            map.insert(category, day);
            Self::write_map(&path, &map)
        })
        .await
        .map_err(map_join_error)?
    }
}
