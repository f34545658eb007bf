//! CSV rendering of call logs.
//!
//! Fields are joined with commas and are NOT quoted or escaped: a comma inside
//! a phone number or a locale-formatted date shifts the columns of that row.

use std::path::{Path, PathBuf};

use chrono::{
    format::{Item, StrftimeItems},
    DateTime, FixedOffset, Local, NaiveDate, Offset, Utc,
};

use crate::{domain::CallLogEntry, Result};

pub const CSV_HEADER: &str = "ID,Caller Number,Called Number,Call Date,Call Time";

/// `1/20/2024`
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";
/// `9:15:00 AM`
pub const DEFAULT_TIME_FORMAT: &str = "%-I:%M:%S %p";

/// True when chrono can render `fmt` without hitting an unknown specifier.
pub fn is_valid_format(fmt: &str) -> bool {
    !StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error))
}

/// Time zone the date/time columns are rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportZone {
    Local,
    Fixed(FixedOffset),
}

/// How `created_at` is split into the date and time columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvFormat {
    date_format: String,
    time_format: String,
    zone: ExportZone,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            zone: ExportZone::Local,
        }
    }
}

impl CsvFormat {
    /// Formats are checked here so rendering never meets an invalid specifier.
    pub fn new(date_format: &str, time_format: &str, zone: ExportZone) -> Result<Self> {
        for fmt in [date_format, time_format] {
            if !is_valid_format(fmt) {
                return Err(crate::Error::Config(format!(
                    "invalid strftime format: {fmt:?}"
                )));
            }
        }
        Ok(Self {
            date_format: date_format.to_string(),
            time_format: time_format.to_string(),
            zone,
        })
    }

    pub fn utc() -> Self {
        Self {
            zone: ExportZone::Fixed(Utc.fix()),
            ..Self::default()
        }
    }

    fn render(&self, ts: &DateTime<Utc>, fmt: &str) -> String {
        match self.zone {
            ExportZone::Local => ts.with_timezone(&Local).format(fmt).to_string(),
            ExportZone::Fixed(offset) => ts.with_timezone(&offset).format(fmt).to_string(),
        }
    }

    pub fn date(&self, ts: &DateTime<Utc>) -> String {
        self.render(ts, &self.date_format)
    }

    pub fn time(&self, ts: &DateTime<Utc>) -> String {
        self.render(ts, &self.time_format)
    }
}

/// Header line plus one line per row, joined with `\n`, no trailing newline.
pub fn encode_call_logs(rows: &[CallLogEntry], format: &CsvFormat) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for row in rows {
        lines.push(
            [
                row.id.to_string(),
                row.phone_number.clone(),
                row.called.clone(),
                format.date(&row.created_at),
                format.time(&row.created_at),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

/// `call-logs-2024-01-20.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("call-logs-{}.csv", date.format("%Y-%m-%d"))
}

/// A rendered export, ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvArtifact {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
}

impl CsvArtifact {
    /// The file name carries the UTC calendar date of `exported_at`.
    pub fn build(rows: &[CallLogEntry], format: &CsvFormat, exported_at: DateTime<Utc>) -> Self {
        Self {
            file_name: export_file_name(exported_at.date_naive()),
            content: encode_call_logs(rows, format),
            rows: rows.len(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    /// Write into `dir` (created if missing); an existing file is overwritten.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.as_bytes()).await?;
        Ok(path)
    }
}
