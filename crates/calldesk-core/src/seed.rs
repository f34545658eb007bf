//! Static seed data every session starts from.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{CallLogEntry, NumberMapping};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .unwrap_or_default()
}

pub fn number_mappings() -> Vec<NumberMapping> {
    vec![
        NumberMapping {
            id: 1,
            phone_number: "+1234567890".to_string(),
            audio_url: "https://example.com/audio1.mp3".to_string(),
            text_content: "Thank you for calling! We will get back to you soon.".to_string(),
            created_at: at(2024, 1, 15, 10, 30),
        },
        NumberMapping {
            id: 2,
            phone_number: "+0987654321".to_string(),
            audio_url: "https://example.com/audio2.mp3".to_string(),
            text_content: "Your call is important to us. Please expect a follow-up message."
                .to_string(),
            created_at: at(2024, 1, 16, 14, 20),
        },
    ]
}

pub fn call_logs() -> Vec<CallLogEntry> {
    let entry = |id, caller: &str, called: &str, created_at| CallLogEntry {
        id,
        phone_number: caller.to_string(),
        called: called.to_string(),
        created_at,
    };

    vec![
        entry(1, "+1111111111", "+1234567890", at(2024, 1, 20, 9, 15)),
        entry(2, "+2222222222", "+1234567890", at(2024, 1, 20, 11, 30)),
        entry(3, "+3333333333", "+0987654321", at(2024, 1, 20, 15, 45)),
    ]
}
