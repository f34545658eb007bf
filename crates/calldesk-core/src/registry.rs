//! Campaign number registry: the list of number mappings plus its creation form.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    domain::{AddNumberRequest, AudioAttachment, NumberMapping, RecordId},
    errors::Error,
    notify::{port::emit, Notice, Notifier},
    ports::NumberGateway,
    store::DataStore,
    Result,
};

/// Audio URL given to records created locally, before any upload happens.
pub fn placeholder_audio_url(id: RecordId) -> String {
    format!("https://example.com/audio{id}.mp3")
}

/// State of the "add number" dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberForm {
    pub phone_number: String,
    pub text_content: String,
    pub audio: Option<AudioAttachment>,
    open: bool,
}

impl NumberForm {
    pub fn is_open(&self) -> bool {
        self.open
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct NumberRegistry {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    form: NumberForm,
}

impl NumberRegistry {
    pub fn new(store: Arc<DataStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            form: NumberForm::default(),
        }
    }

    pub async fn list(&self) -> Vec<NumberMapping> {
        self.store.numbers().await
    }

    pub async fn get(&self, id: RecordId) -> Option<NumberMapping> {
        self.store.number(id).await
    }

    pub async fn len(&self) -> usize {
        self.store.number_count().await
    }

    /// Append a new mapping. Memory-only: nothing is uploaded.
    pub async fn create(
        &self,
        phone_number: &str,
        text_content: &str,
        audio: Option<&AudioAttachment>,
    ) -> Result<NumberMapping> {
        let req = match AddNumberRequest::new(phone_number, text_content, audio) {
            Ok(req) => req,
            Err(e) => {
                self.missing_fields().await;
                return Err(e);
            }
        };

        let record = self
            .store
            .insert_number_with(|id| NumberMapping {
                id,
                phone_number: req.phone_number,
                audio_url: placeholder_audio_url(id),
                text_content: req.text_content,
                created_at: Utc::now(),
            })
            .await;
        let record = match record {
            Ok(record) => record,
            Err(e) => return Err(self.insert_failed(e, "Failed to add phone number.").await),
        };

        tracing::info!(id = record.id, phone = %record.phone_number, "number mapping created");
        emit(
            self.notifier.as_ref(),
            Notice::info("Success", "Phone number added successfully!"),
        )
        .await;
        Ok(record)
    }

    /// Copy `source` as a template: new id, blank phone number, fresh timestamp.
    pub async fn duplicate(&self, source: &NumberMapping) -> Result<NumberMapping> {
        let record = self
            .store
            .insert_number_with(|id| NumberMapping {
                id,
                phone_number: String::new(),
                created_at: Utc::now(),
                ..source.clone()
            })
            .await;
        let record = match record {
            Ok(record) => record,
            Err(e) => return Err(self.insert_failed(e, "Failed to duplicate campaign.").await),
        };

        tracing::info!(from = source.id, id = record.id, "campaign duplicated");
        emit(
            self.notifier.as_ref(),
            Notice::info(
                "Campaign Duplicated",
                "Campaign template has been duplicated. Update the phone number.",
            ),
        )
        .await;
        Ok(record)
    }

    pub async fn duplicate_by_id(&self, id: RecordId) -> Result<NumberMapping> {
        let source = self
            .store
            .number(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("number mapping {id}")))?;
        self.duplicate(&source).await
    }

    // ============== Creation form ==============

    pub fn form(&self) -> &NumberForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut NumberForm {
        &mut self.form
    }

    pub fn open_form(&mut self) {
        self.form.open = true;
    }

    /// Close the dialog; typed values stay for the next time it opens.
    pub fn cancel_form(&mut self) {
        self.form.open = false;
    }

    /// Create from the form. On success the form is blanked and closed;
    /// on failure it is left exactly as the user filled it.
    pub async fn submit_form(&mut self) -> Result<NumberMapping> {
        let record = self
            .create(
                &self.form.phone_number,
                &self.form.text_content,
                self.form.audio.as_ref(),
            )
            .await?;
        self.form.reset();
        Ok(record)
    }

    // ============== Backend sync ==============

    /// Replace the local list with what the backend holds.
    pub async fn pull(&self, gateway: &dyn NumberGateway) -> Result<usize> {
        match gateway.list_numbers().await {
            Ok(records) => {
                let n = records.len();
                self.store.replace_numbers(records).await;
                tracing::info!(count = n, "number mappings pulled");
                Ok(n)
            }
            Err(e) => {
                tracing::warn!("pull failed: {e}");
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Error", "Failed to load phone numbers."),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Send a new mapping to the backend and keep the record it returns.
    pub async fn publish(
        &self,
        gateway: &dyn NumberGateway,
        phone_number: &str,
        text_content: &str,
        audio: Option<&AudioAttachment>,
    ) -> Result<NumberMapping> {
        let req = match AddNumberRequest::new(phone_number, text_content, audio) {
            Ok(req) => req,
            Err(e) => {
                self.missing_fields().await;
                return Err(e);
            }
        };

        match gateway.add_number(req).await {
            Ok(record) => {
                self.store.upsert_number(record.clone()).await;
                tracing::info!(id = record.id, "number mapping published");
                emit(
                    self.notifier.as_ref(),
                    Notice::info("Success", "Phone number added successfully!"),
                )
                .await;
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("publish failed: {e}");
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Error", "Failed to add phone number."),
                )
                .await;
                Err(e)
            }
        }
    }

    async fn insert_failed(&self, err: Error, description: &str) -> Error {
        tracing::warn!("insert failed: {err}");
        emit(self.notifier.as_ref(), Notice::error("Error", description)).await;
        err
    }

    async fn missing_fields(&self) {
        emit(
            self.notifier.as_ref(),
            Notice::error("Missing Fields", "Please fill in all required fields."),
        )
        .await;
    }
}
