//! Collection service - core business logic
//!
//! Drives entry recording, the working-set view, and the daily submit.
//! Every operation re-reads from the store rather than trusting the
//! session cache, and every user-visible failure carries a short
//! Indonesian status message.

use std::collections::HashMap;
use std::sync::Arc;

use chrono_tz::Tz;
use jimpitan_domain::utils::{collection_day, resolve_timezone};
use jimpitan_domain::{
    CollectionConfig, DirectUpload, DonationEntry, EntryPatch, JimpitanError, NewEntry,
    NewQueueItem, QueueStatus, RecordedEntry, Result, UploadOutcome, WireEntry, WorkingSet,
};
use tracing::{info, warn};

use crate::guard::DailyUploadGuard;
use crate::store::ports::{EntryStore, UploadQueue};
use crate::sync::ports::{ConnectivityProbe, UploadTransport};

use super::session::SessionState;

/// Collection service owning the view-facing operations.
pub struct CollectionService {
    entries: Arc<dyn EntryStore>,
    queue: Arc<dyn UploadQueue>,
    transport: Arc<dyn UploadTransport>,
    connectivity: Arc<dyn ConnectivityProbe>,
    guard: Arc<DailyUploadGuard>,
    session: Arc<SessionState>,
    collection: CollectionConfig,
    timezone: Tz,
}

impl CollectionService {
    /// Create a new collection service.
    ///
    /// # Errors
    /// Returns `JimpitanError::Config` if the configured timezone is
    /// unknown.
    pub fn new(
        entries: Arc<dyn EntryStore>,
        queue: Arc<dyn UploadQueue>,
        transport: Arc<dyn UploadTransport>,
        connectivity: Arc<dyn ConnectivityProbe>,
        guard: Arc<DailyUploadGuard>,
        session: Arc<SessionState>,
        collection: CollectionConfig,
    ) -> Result<Self> {
        let timezone = resolve_timezone(&collection.timezone)?;
        Ok(Self { entries, queue, transport, connectivity, guard, session, collection, timezone })
    }

    /// Record a donor's contribution for today.
    ///
    /// At most one entry exists per donor, category, and day: a repeat
    /// call updates the stored amount instead of inserting a second row.
    /// Zero is a valid amount and gets its own confirmation message.
    pub async fn record_entry(
        &self,
        donor: &str,
        amount: i64,
        category: &str,
    ) -> Result<RecordedEntry> {
        let donor = donor.trim();
        if donor.is_empty() {
            return Err(JimpitanError::Validation(
                "Nama dan nominal tidak boleh kosong".to_string(),
            ));
        }
        if amount < 0 {
            return Err(JimpitanError::Validation("Nominal tidak boleh negatif".to_string()));
        }
        let roster = self.roster(category)?;
        if !roster.iter().any(|name| name == donor) {
            return Err(JimpitanError::Validation(format!(
                "Donatur {} tidak terdaftar di kategori {}",
                donor,
                self.collection.label(category)
            )));
        }

        let today = collection_day(&self.timezone);
        let recorded = match self.entries.find_entry(donor, category, &today).await? {
            Some(existing) => {
                let patch = EntryPatch {
                    amount: Some(amount),
                    entry_date: Some(today.clone()),
                    synced: None,
                };
                let entry = self.entries.update_entry(existing.id, &patch).await?;
                RecordedEntry {
                    message: format!("✏️ Data {} diperbarui", donor),
                    created: false,
                    entry,
                }
            }
            None => {
                let entry = self
                    .entries
                    .create_entry(&NewEntry {
                        donor: donor.to_string(),
                        amount,
                        category: category.to_string(),
                        entry_date: today,
                    })
                    .await?;
                let message = if amount == 0 {
                    format!("✅ Data {} disimpan (tidak mengisi)", donor)
                } else {
                    format!("✅ Data {} berhasil disimpan", donor)
                };
                RecordedEntry { message, created: true, entry }
            }
        };

        self.session.upsert_working(recorded.entry.clone());
        Ok(recorded)
    }

    /// Change the amount on an existing entry.
    pub async fn edit_entry(&self, id: i64, new_amount: i64) -> Result<DonationEntry> {
        if new_amount < 0 {
            return Err(JimpitanError::Validation("Nominal tidak boleh negatif".to_string()));
        }
        let updated = self.entries.update_entry(id, &EntryPatch::amount(new_amount)).await?;
        self.session.upsert_working(updated.clone());
        Ok(updated)
    }

    /// Delete a single entry. A missing id surfaces as `NotFound`.
    pub async fn delete_entry(&self, id: i64) -> Result<()> {
        self.entries.delete_entry(id).await?;
        self.session.remove_working(id);
        Ok(())
    }

    /// Delete every entry recorded today for a category. Returns the
    /// number deleted; zero is not an error.
    pub async fn delete_all_today(&self, category: &str) -> Result<usize> {
        self.roster(category)?;
        let today = collection_day(&self.timezone);
        let deleted = self.entries.delete_entries_for_day(category, &today).await?;
        self.session.clear_working(category);
        Ok(deleted)
    }

    /// Today's entries for the active category, re-read from the store.
    pub async fn get_working_set(&self) -> Result<WorkingSet> {
        let category = self.session.active_category();
        self.working_set_for(&category).await
    }

    /// Switch the active category and load its working set.
    pub async fn set_active_category(&self, category: &str) -> Result<WorkingSet> {
        self.roster(category)?;
        self.session.set_active_category(category);
        self.working_set_for(category).await
    }

    /// Whether every roster member for the category has an entry today.
    pub async fn is_roster_complete(&self, category: &str) -> Result<bool> {
        let roster = self.roster(category)?;
        let today = collection_day(&self.timezone);
        let entries = self.entries.get_entries(category, Some(&today)).await?;
        let entered: HashMap<&str, ()> =
            entries.iter().map(|entry| (entry.donor.as_str(), ())).collect();
        Ok(roster.iter().all(|donor| entered.contains_key(donor.as_str())))
    }

    /// Submit today's entries for a category.
    ///
    /// Preconditions, checked in order before any payload is built:
    /// already uploaded today, nothing to upload, roster incomplete. When
    /// online, one bounded direct attempt is made; on failure or offline
    /// the payload is queued for the background drain. Both the direct
    /// success and the enqueue lock the category for the rest of the day.
    pub async fn submit(&self, category: &str) -> Result<UploadOutcome> {
        let roster = self.roster(category)?;

        if self.guard.is_locked_today(category).await? {
            return Err(JimpitanError::Validation(
                "Anda sudah melakukan upload hari ini untuk kategori ini. Upload hanya dapat dilakukan sekali per hari."
                    .to_string(),
            ));
        }

        let today = collection_day(&self.timezone);
        let entries = self.entries.get_entries(category, Some(&today)).await?;
        if entries.is_empty() {
            return Err(JimpitanError::Validation("Tidak ada data untuk diupload".to_string()));
        }

        let by_donor: HashMap<&str, &DonationEntry> =
            entries.iter().map(|entry| (entry.donor.as_str(), entry)).collect();
        let missing =
            roster.iter().filter(|donor| !by_donor.contains_key(donor.as_str())).count();
        if missing > 0 {
            return Err(JimpitanError::Validation(format!(
                "Masih ada {} donatur yang belum diinput. Harap lengkapi semua data terlebih dahulu.",
                missing
            )));
        }

        // Payload rows follow the fixed roster sequence, not entry order.
        let data: Vec<WireEntry> = roster
            .iter()
            .filter_map(|donor| by_donor.get(donor.as_str()).copied().map(WireEntry::from))
            .collect();
        let payload = DirectUpload::new(category, data);

        if self.connectivity.is_online() {
            match self.transport.send_direct(&payload).await {
                Ok(ack) => {
                    self.guard.lock_at(category, payload.timestamp).await?;
                    self.session.clear_working(category);
                    let message = format!(
                        "✅ {}",
                        ack.message.unwrap_or_else(|| format!(
                            "Data berhasil diupload untuk kategori {}",
                            self.collection.label(category)
                        ))
                    );
                    info!(category, entries = payload.data.len(), "Direct upload delivered");
                    return Ok(UploadOutcome::Uploaded { message });
                }
                Err(err) => {
                    warn!(error = %err, category, "Direct upload failed, queueing for later");
                }
            }
        }

        let payload_json = serde_json::to_string(&payload.data).map_err(|e| {
            JimpitanError::Internal(format!("Failed to serialize upload payload: {}", e))
        })?;
        self.queue
            .enqueue(&NewQueueItem {
                payload_json,
                category: category.to_string(),
                entry_date: today,
            })
            .await?;
        self.guard.lock_today(category).await?;
        Ok(UploadOutcome::Queued {
            message: "💾 Data disimpan untuk upload otomatis ketika koneksi tersedia".to_string(),
        })
    }

    /// Pending-queue snapshot for startup notices.
    pub async fn queue_status(&self) -> Result<QueueStatus> {
        self.queue.status().await
    }

    async fn working_set_for(&self, category: &str) -> Result<WorkingSet> {
        let roster = self.roster(category)?;
        let roster_size = roster.len();
        let today = collection_day(&self.timezone);
        let entries = self.entries.get_entries(category, Some(&today)).await?;
        self.session.replace_working(category, entries.clone());
        Ok(WorkingSet { category: category.to_string(), entry_date: today, entries, roster_size })
    }

    fn roster(&self, category: &str) -> Result<&[String]> {
        self.collection.roster(category).ok_or_else(|| {
            JimpitanError::Validation(format!("Kategori tidak dikenal: {}", category))
        })
    }
}
