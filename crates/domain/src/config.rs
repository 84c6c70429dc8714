//! Configuration structures
//!
//! Shared configuration for storage, upload, sync, retention, and the
//! collection rosters. Sections are individually defaulted so a config
//! file only needs to spell out what it overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COLLECTION_TIMEZONE, DEFAULT_UPLOAD_URL, DIRECT_UPLOAD_TIMEOUT_SECS,
    QUEUE_DRAIN_TIMEOUT_SECS, QUEUE_ITEM_MAX_AGE_DAYS, SYNCED_ENTRY_MAX_AGE_DAYS,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

/// Upload endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub url: String,
    /// Timeout for a foreground upload attempt, in seconds.
    pub direct_timeout_secs: u64,
    /// Timeout for one queued item during a background drain, in seconds.
    pub queue_item_timeout_secs: u64,
}

/// Background sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
}

/// Retention sweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub interval_seconds: u64,
    pub enabled: bool,
    pub synced_max_age_days: i64,
    pub queue_max_age_days: i64,
}

/// Collection rosters and day-rollover timezone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// IANA timezone name used when stamping entry dates.
    pub timezone: String,
    /// Category id to ordered donor roster.
    pub rosters: BTreeMap<String, Vec<String>>,
    /// Category id to display label.
    pub labels: BTreeMap<String, String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "jimpitan.db".to_string(), pool_size: 8 }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPLOAD_URL.to_string(),
            direct_timeout_secs: DIRECT_UPLOAD_TIMEOUT_SECS,
            queue_item_timeout_secs: QUEUE_DRAIN_TIMEOUT_SECS,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { interval_seconds: 30, enabled: true }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
            synced_max_age_days: SYNCED_ENTRY_MAX_AGE_DAYS,
            queue_max_age_days: QUEUE_ITEM_MAX_AGE_DAYS,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_COLLECTION_TIMEZONE.to_string(),
            rosters: default_rosters(),
            labels: default_labels(),
        }
    }
}

impl CollectionConfig {
    /// Ordered donor roster for a category, if the category exists.
    pub fn roster(&self, category: &str) -> Option<&[String]> {
        self.rosters.get(category).map(Vec::as_slice)
    }

    /// Display label for a category, falling back to the raw id.
    pub fn label<'a>(&'a self, category: &'a str) -> &'a str {
        self.labels.get(category).map(String::as_str).unwrap_or(category)
    }
}

fn default_rosters() -> BTreeMap<String, Vec<String>> {
    let mut rosters = BTreeMap::new();
    rosters.insert(
        "kategori1".to_string(),
        [
            "Mas Ani",
            "Pak Kholis",
            "Pak Hasyim",
            "Amat",
            "Mbak Is",
            "Dani",
            "Pak Napi",
            "Pak Ipin",
            "Mas Agus BZ",
            "Pak Fat",
            "Pak Ropi",
            "Mas Umam",
            "Pak Kisman",
            "Pak Yanto",
            "Pak Pardi",
            "Pak Salam",
            "Pak Piyan",
            "Pak Slamet",
            "Pak Ibin",
            "Idek",
            "Pak Ngari",
            "Pak Tukhin",
            "Pak Rofiq",
            "Pak Syafak",
            "Pak Jubaidi",
            "Mbak Kholis",
            "Pak Kholiq",
            "Pak Rokhan",
            "Mas Agus",
            "Mas Izin",
            "Pak Abror",
            "Mas Gustaf",
        ]
        .iter()
        .map(ToString::to_string)
        .collect(),
    );
    rosters.insert(
        "kategori2".to_string(),
        ["Pak A", "Pak B", "Pak C"].iter().map(ToString::to_string).collect(),
    );
    rosters.insert(
        "kategori3".to_string(),
        ["Pak A", "Pak B", "Pak C"].iter().map(ToString::to_string).collect(),
    );
    rosters
}

fn default_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("kategori1".to_string(), "RT Tengah".to_string());
    labels.insert("kategori2".to_string(), "RT Kulon".to_string());
    labels.insert("kategori3".to_string(), "RT Kidul".to_string());
    labels
}
