use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

/// Numeric record id, unique within its collection.
pub type RecordId = u64;

/// Association of a phone number with spoken audio and a follow-up text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberMapping {
    pub id: RecordId,
    pub phone_number: String,
    pub audio_url: String,
    pub text_content: String,
    pub created_at: DateTime<Utc>,
}

/// One inbound call: who called (`phone_number`) and which number they dialed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    pub id: RecordId,
    pub phone_number: String,
    pub called: String,
    pub created_at: DateTime<Utc>,
}

/// Audio file picked for a campaign. The bytes are carried, never inspected.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioAttachment {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl AudioAttachment {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.trim().is_empty() && self.data.is_empty()
    }
}

impl std::fmt::Debug for AudioAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioAttachment")
            .field("file_name", &self.file_name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Validated payload for the backend `add-number` operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddNumberRequest {
    pub phone_number: String,
    pub text_content: String,
    pub audio: AudioAttachment,
}

impl AddNumberRequest {
    /// Every field is required; blank strings count as missing.
    pub fn new(
        phone_number: &str,
        text_content: &str,
        audio: Option<&AudioAttachment>,
    ) -> Result<Self> {
        let audio = audio.filter(|a| !a.is_empty());
        match audio {
            Some(audio) if !phone_number.trim().is_empty() && !text_content.trim().is_empty() => {
                Ok(Self {
                    phone_number: phone_number.to_string(),
                    text_content: text_content.to_string(),
                    audio: audio.clone(),
                })
            }
            _ => Err(Error::Validation(
                "Please fill in all required fields.".to_string(),
            )),
        }
    }
}

/// A single text message broadcast to every distinct caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub body: String,
}

impl BroadcastMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.body.trim().is_empty() {
            return Err(Error::Validation(
                "Please enter a message to send.".to_string(),
            ));
        }
        Ok(())
    }
}
