//! Integration settings: credentials, feature toggles and numeric limits.

use std::{ops::RangeInclusive, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    errors::Error,
    notify::{port::emit, Notice, Notifier},
    ports::SettingsSink,
    store::DataStore,
    Result,
};

pub const DEFAULT_FROM_NUMBER: &str = "+19296596292";
pub const MAX_MESSAGE_LENGTH_RANGE: RangeInclusive<u32> = 1..=1600;
pub const RESPONSE_DELAY_RANGE: RangeInclusive<u32> = 0..=300;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub default_from_number: String,
    pub enable_auto_response: bool,
    pub enable_call_logging: bool,
    pub max_message_length: u32,
    /// Seconds to wait before the automatic response goes out.
    pub response_delay: u32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            default_from_number: DEFAULT_FROM_NUMBER.to_string(),
            enable_auto_response: true,
            enable_call_logging: true,
            max_message_length: 160,
            response_delay: 0,
        }
    }
}

impl SettingsRecord {
    /// Startup defaults: credentials from the environment, the rest hardcoded.
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            twilio_account_sid: cfg.twilio_account_sid.clone(),
            twilio_auth_token: cfg.twilio_auth_token.clone(),
            default_from_number: cfg.default_from_number.clone(),
            ..Self::default()
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) -> Result<()> {
        match update {
            SettingsUpdate::TwilioAccountSid(v) => self.twilio_account_sid = v,
            SettingsUpdate::TwilioAuthToken(v) => self.twilio_auth_token = v,
            SettingsUpdate::DefaultFromNumber(v) => self.default_from_number = v,
            SettingsUpdate::EnableAutoResponse(v) => self.enable_auto_response = v,
            SettingsUpdate::EnableCallLogging(v) => self.enable_call_logging = v,
            SettingsUpdate::MaxMessageLength(v) => {
                self.max_message_length = check_range("maxMessageLength", v, &MAX_MESSAGE_LENGTH_RANGE)?
            }
            SettingsUpdate::ResponseDelay(v) => {
                self.response_delay = check_range("responseDelay", v, &RESPONSE_DELAY_RANGE)?
            }
        }
        Ok(())
    }

    /// Copy safe to display: credentials keep only their last 4 characters.
    pub fn masked(&self) -> Self {
        Self {
            twilio_account_sid: mask_secret(&self.twilio_account_sid),
            twilio_auth_token: mask_secret(&self.twilio_auth_token),
            ..self.clone()
        }
    }
}

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<u32> {
    if range.contains(&value) {
        return Ok(value);
    }
    Err(Error::Validation(format!(
        "{field} must be between {} and {}",
        range.start(),
        range.end()
    )))
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

/// A single field replacement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsUpdate {
    TwilioAccountSid(String),
    TwilioAuthToken(String),
    DefaultFromNumber(String),
    EnableAutoResponse(bool),
    EnableCallLogging(bool),
    MaxMessageLength(u32),
    ResponseDelay(u32),
}

impl SettingsUpdate {
    /// Parse console input. Keys are accepted in camelCase or snake_case.
    pub fn parse(key: &str, raw: &str) -> Result<Self> {
        let normalized = key.trim().replace('_', "").to_lowercase();
        let raw = raw.trim();

        let update = match normalized.as_str() {
            "twilioaccountsid" | "accountsid" => Self::TwilioAccountSid(raw.to_string()),
            "twilioauthtoken" | "authtoken" => Self::TwilioAuthToken(raw.to_string()),
            "defaultfromnumber" | "fromnumber" => Self::DefaultFromNumber(raw.to_string()),
            "enableautoresponse" => Self::EnableAutoResponse(parse_bool(key, raw)?),
            "enablecalllogging" => Self::EnableCallLogging(parse_bool(key, raw)?),
            "maxmessagelength" => Self::MaxMessageLength(parse_u32(key, raw)?),
            "responsedelay" => Self::ResponseDelay(parse_u32(key, raw)?),
            _ => {
                return Err(Error::Validation(format!("unknown setting: {key}")));
            }
        };
        Ok(update)
    }

    pub fn field(&self) -> &'static str {
        match self {
            Self::TwilioAccountSid(_) => "twilioAccountSid",
            Self::TwilioAuthToken(_) => "twilioAuthToken",
            Self::DefaultFromNumber(_) => "defaultFromNumber",
            Self::EnableAutoResponse(_) => "enableAutoResponse",
            Self::EnableCallLogging(_) => "enableCallLogging",
            Self::MaxMessageLength(_) => "maxMessageLength",
            Self::ResponseDelay(_) => "responseDelay",
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Validation(format!("{key} expects on/off, got {raw:?}"))),
    }
}

fn parse_u32(key: &str, raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|_| Error::Validation(format!("{key} expects a whole number, got {raw:?}")))
}

/// Settings view: field updates plus a save action.
pub struct SettingsStore {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn SettingsSink>,
}

impl SettingsStore {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn SettingsSink>,
    ) -> Self {
        Self {
            store,
            notifier,
            sink,
        }
    }

    pub async fn current(&self) -> SettingsRecord {
        self.store.settings().await
    }

    /// Replace one field in memory. An invalid value leaves the record as it was.
    pub async fn update(&self, update: SettingsUpdate) -> Result<SettingsRecord> {
        let field = update.field();
        match self.store.update_settings(|s| s.apply(update)).await {
            Ok(record) => {
                tracing::debug!(field, "setting updated");
                Ok(record)
            }
            Err(e) => {
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Invalid Setting", describe(&e)),
                )
                .await;
                Err(e)
            }
        }
    }

    pub async fn save(&mut self) -> Result<()> {
        let record = self.store.settings().await;
        match self.sink.persist(&record).await {
            Ok(()) => {
                emit(
                    self.notifier.as_ref(),
                    Notice::info(
                        "Settings Saved",
                        "Your configuration has been updated successfully.",
                    ),
                )
                .await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("settings save failed: {e}");
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Error", "Failed to save settings."),
                )
                .await;
                Err(e)
            }
        }
    }
}

fn describe(e: &Error) -> String {
    match e {
        Error::Validation(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use async_trait::async_trait;

    struct FailingSink;

    #[async_trait]
    impl SettingsSink for FailingSink {
        async fn persist(&self, _record: &SettingsRecord) -> Result<()> {
            Err(Error::External("disk on fire".to_string()))
        }
    }

    struct OkSink;

    #[async_trait]
    impl SettingsSink for OkSink {
        async fn persist(&self, _record: &SettingsRecord) -> Result<()> {
            Ok(())
        }
    }

    fn view(sink: Arc<dyn SettingsSink>) -> (SettingsStore, Arc<MemoryNotifier>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let store = Arc::new(DataStore::default());
        (SettingsStore::new(store, notifier.clone(), sink), notifier)
    }

    #[test]
    fn defaults_match_reference_values() {
        let s = SettingsRecord::default();
        assert_eq!(s.default_from_number, "+19296596292");
        assert!(s.enable_auto_response && s.enable_call_logging);
        assert_eq!(s.max_message_length, 160);
        assert_eq!(s.response_delay, 0);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let v = serde_json::to_value(SettingsRecord::default()).unwrap();
        assert_eq!(v["maxMessageLength"], 160);
        assert_eq!(v["defaultFromNumber"], "+19296596292");
        assert!(v.get("max_message_length").is_none());
    }

    #[test]
    fn parse_accepts_both_key_styles() {
        assert_eq!(
            SettingsUpdate::parse("maxMessageLength", "320").unwrap(),
            SettingsUpdate::MaxMessageLength(320)
        );
        assert_eq!(
            SettingsUpdate::parse("enable_call_logging", "off").unwrap(),
            SettingsUpdate::EnableCallLogging(false)
        );
        assert!(SettingsUpdate::parse("colour", "blue").is_err());
        assert!(SettingsUpdate::parse("responseDelay", "soon").is_err());
    }

    #[test]
    fn masked_keeps_last_four() {
        let s = SettingsRecord {
            twilio_account_sid: "AC1234567890".to_string(),
            twilio_auth_token: "abc".to_string(),
            ..SettingsRecord::default()
        };
        let m = s.masked();
        assert_eq!(m.twilio_account_sid, "********7890");
        assert_eq!(m.twilio_auth_token, "***");
    }

    #[tokio::test]
    async fn update_rejects_out_of_range_and_keeps_record() {
        let (view, notifier) = view(Arc::new(OkSink));

        let err = view
            .update(SettingsUpdate::MaxMessageLength(0))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(view.update(SettingsUpdate::ResponseDelay(301)).await.is_err());
        assert_eq!(view.current().await, SettingsRecord::default());
        assert_eq!(notifier.notices().await.len(), 2);

        let rec = view
            .update(SettingsUpdate::MaxMessageLength(1600))
            .await
            .unwrap();
        assert_eq!(rec.max_message_length, 1600);
        let rec = view.update(SettingsUpdate::ResponseDelay(300)).await.unwrap();
        assert_eq!(rec.response_delay, 300);
    }

    #[tokio::test]
    async fn save_notifies_success() {
        let (mut view, notifier) = view(Arc::new(OkSink));
        view.save().await.unwrap();
        assert_eq!(notifier.last().await.unwrap().title, "Settings Saved");
    }

    #[tokio::test]
    async fn save_failure_keeps_values_and_reports() {
        let (mut view, notifier) = view(Arc::new(FailingSink));
        view.update(SettingsUpdate::ResponseDelay(5)).await.unwrap();

        assert!(view.save().await.is_err());
        assert_eq!(view.current().await.response_delay, 5);
        let last = notifier.last().await.unwrap();
        assert!(last.is_error());
        assert_eq!(last.description, "Failed to save settings.");
    }
}
