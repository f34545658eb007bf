use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{csv_export, errors::Error, settings::DEFAULT_FROM_NUMBER, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://www.myapp.com/api/v1/calling";

/// Typed configuration for a calldesk session.
///
/// Credentials are read once at startup. Runtime edits go through the settings
/// view and are never written back here.
#[derive(Clone, Debug)]
pub struct Config {
    // Twilio
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub default_from_number: String,

    // Backend
    pub api_base_url: String,
    pub use_remote: bool,
    pub http_timeout: Duration,

    // Simulated latency
    pub blast_send_delay: Duration,
    pub settings_save_delay: Duration,

    // CSV export
    pub export_dir: PathBuf,
    pub csv_date_format: String,
    pub csv_time_format: String,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let twilio_account_sid = lookup("TWILIO_ACCOUNT_SID").unwrap_or_default();
        let twilio_auth_token = lookup("TWILIO_AUTH_TOKEN").unwrap_or_default();
        let default_from_number = lookup("DEFAULT_FROM_NUMBER")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_FROM_NUMBER.to_string());

        let api_base_url = lookup("CALLDESK_API_BASE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "CALLDESK_API_BASE_URL must be an http(s) URL, got {api_base_url:?}"
            )));
        }
        let use_remote = parse_bool(lookup("CALLDESK_USE_REMOTE")).unwrap_or(false);
        let http_timeout = Duration::from_millis(parse_u64(lookup("HTTP_TIMEOUT_MS")).unwrap_or(10_000));

        let blast_send_delay =
            Duration::from_millis(parse_u64(lookup("BLAST_SEND_DELAY_MS")).unwrap_or(2000));
        let settings_save_delay =
            Duration::from_millis(parse_u64(lookup("SETTINGS_SAVE_DELAY_MS")).unwrap_or(1000));

        let export_dir = PathBuf::from(
            lookup("CALLDESK_EXPORT_DIR")
                .and_then(non_empty)
                .unwrap_or_else(|| ".".to_string()),
        );
        let csv_date_format = lookup("CSV_DATE_FORMAT")
            .and_then(non_empty)
            .unwrap_or_else(|| csv_export::DEFAULT_DATE_FORMAT.to_string());
        let csv_time_format = lookup("CSV_TIME_FORMAT")
            .and_then(non_empty)
            .unwrap_or_else(|| csv_export::DEFAULT_TIME_FORMAT.to_string());
        for (key, fmt) in [
            ("CSV_DATE_FORMAT", &csv_date_format),
            ("CSV_TIME_FORMAT", &csv_time_format),
        ] {
            if !csv_export::is_valid_format(fmt) {
                return Err(Error::Config(format!("{key} is not a valid strftime format: {fmt:?}")));
            }
        }

        Ok(Self {
            twilio_account_sid,
            twilio_auth_token,
            default_from_number,
            api_base_url,
            use_remote,
            http_timeout,
            blast_send_delay,
            settings_save_delay,
            export_dir,
            csv_date_format,
            csv_time_format,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
