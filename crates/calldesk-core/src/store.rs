//! Single data-access layer for every collection a session works on.
//!
//! Views receive an `Arc<DataStore>` instead of owning their own copies, so a
//! derived view (blast recipients, filtered logs) always sees the live data.

use tokio::sync::RwLock;

use crate::{
    domain::{CallLogEntry, NumberMapping, RecordId},
    errors::Error,
    seed,
    settings::SettingsRecord,
    Result,
};

#[derive(Debug, Default)]
pub struct DataStore {
    numbers: RwLock<Vec<NumberMapping>>,
    call_logs: RwLock<Vec<CallLogEntry>>,
    settings: RwLock<SettingsRecord>,
}

impl DataStore {
    pub fn new(
        numbers: Vec<NumberMapping>,
        call_logs: Vec<CallLogEntry>,
        settings: SettingsRecord,
    ) -> Self {
        Self {
            numbers: RwLock::new(numbers),
            call_logs: RwLock::new(call_logs),
            settings: RwLock::new(settings),
        }
    }

    /// Store pre-filled with the static seed collections.
    pub fn seeded(settings: SettingsRecord) -> Self {
        Self::new(seed::number_mappings(), seed::call_logs(), settings)
    }

    // ============== Number mappings ==============

    pub async fn numbers(&self) -> Vec<NumberMapping> {
        self.numbers.read().await.clone()
    }

    pub async fn number(&self, id: RecordId) -> Option<NumberMapping> {
        self.numbers
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub async fn number_count(&self) -> usize {
        self.numbers.read().await.len()
    }

    /// Allocate the next id and append the record built for it.
    ///
    /// Allocation and insertion happen under one write lock. When no id is
    /// left above the highest one in use, nothing is inserted.
    pub async fn insert_number_with(
        &self,
        build: impl FnOnce(RecordId) -> NumberMapping,
    ) -> Result<NumberMapping> {
        let mut numbers = self.numbers.write().await;
        let record = build(next_id(numbers.iter().map(|m| m.id))?);
        numbers.push(record.clone());
        Ok(record)
    }

    /// Insert a record whose id was issued elsewhere (the backend).
    /// A local record with the same id is replaced in place.
    pub async fn upsert_number(&self, record: NumberMapping) {
        let mut numbers = self.numbers.write().await;
        match numbers.iter_mut().find(|m| m.id == record.id) {
            Some(slot) => *slot = record,
            None => numbers.push(record),
        }
    }

    pub async fn replace_numbers(&self, records: Vec<NumberMapping>) {
        *self.numbers.write().await = records;
    }

    // ============== Call logs ==============

    pub async fn call_logs(&self) -> Vec<CallLogEntry> {
        self.call_logs.read().await.clone()
    }

    /// Run a derivation against the call logs without cloning them.
    pub async fn with_call_logs<R>(&self, f: impl FnOnce(&[CallLogEntry]) -> R) -> R {
        let logs = self.call_logs.read().await;
        f(&logs)
    }

    // ============== Settings ==============

    pub async fn settings(&self) -> SettingsRecord {
        self.settings.read().await.clone()
    }

    /// Apply `f` to a copy of the settings and commit only if it succeeds.
    pub async fn update_settings(
        &self,
        f: impl FnOnce(&mut SettingsRecord) -> Result<()>,
    ) -> Result<SettingsRecord> {
        let mut settings = self.settings.write().await;
        let mut next = settings.clone();
        f(&mut next)?;
        *settings = next.clone();
        Ok(next)
    }
}

/// One past the highest id in use.
pub fn next_id(ids: impl Iterator<Item = RecordId>) -> Result<RecordId> {
    ids.max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| Error::Validation("record id space exhausted".to_string()))
}
