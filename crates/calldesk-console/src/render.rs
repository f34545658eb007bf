//! Plain-text rendering of the views.

use calldesk_core::{
    csv_export::CsvFormat,
    domain::{CallLogEntry, NumberMapping},
    settings::SettingsRecord,
    Result,
};

const TEXT_PREVIEW_LEN: usize = 40;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    format!("{}...", text.chars().take(max).collect::<String>())
}

pub fn numbers(records: &[NumberMapping], format: &CsvFormat) -> String {
    if records.is_empty() {
        return "No phone numbers configured.".to_string();
    }

    let mut out = vec![format!(
        "{:>4}  {:<16}  {:<43}  {:<34}  {}",
        "ID", "Phone Number", "Text Content", "Audio", "Created"
    )];
    for m in records {
        let phone = if m.phone_number.is_empty() {
            "(unset)"
        } else {
            m.phone_number.as_str()
        };
        out.push(format!(
            "{:>4}  {:<16}  {:<43}  {:<34}  {}",
            m.id,
            phone,
            truncate(&m.text_content, TEXT_PREVIEW_LEN),
            m.audio_url,
            format.date(&m.created_at)
        ));
    }
    out.join("\n")
}

pub fn call_logs(rows: &[CallLogEntry], format: &CsvFormat, summary: &str) -> String {
    let mut out = vec![format!(
        "{:<16}  {:<16}  {:<12}  {}",
        "Caller Number", "Called Number", "Date", "Time"
    )];
    if rows.is_empty() {
        out.push("No call logs found matching your search.".to_string());
    }
    for log in rows {
        out.push(format!(
            "{:<16}  {:<16}  {:<12}  {}",
            log.phone_number,
            log.called,
            format.date(&log.created_at),
            format.time(&log.created_at)
        ));
    }
    out.push(summary.to_string());
    out.join("\n")
}

pub fn recipients(list: &[String]) -> String {
    let mut out = vec![format!("Recipients: {} unique phone numbers", list.len())];
    if !list.is_empty() {
        out.push(list.join("  "));
    }
    out.join("\n")
}

/// Credentials are masked before rendering.
pub fn settings(record: &SettingsRecord) -> Result<String> {
    Ok(serde_json::to_string_pretty(&record.masked())?)
}
