//! Stand-ins for backends that do not exist yet.
//!
//! Each one honours the same port contract as a real implementation, so the
//! views never branch on which one they were given.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    domain::{AddNumberRequest, NumberMapping},
    errors::Error,
    ports::{BlastDispatcher, BlastReceipt, BlastRequest, NumberGateway, SettingsSink},
    registry::placeholder_audio_url,
    seed,
    settings::SettingsRecord,
    store::next_id,
    Result,
};

pub const DEFAULT_BLAST_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Accepts every blast after a fixed delay; nothing is sent.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedDispatcher {
    delay: Duration,
}

impl SimulatedDispatcher {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_BLAST_DELAY)
    }
}

#[async_trait]
impl BlastDispatcher for SimulatedDispatcher {
    async fn dispatch(&self, req: BlastRequest) -> Result<BlastReceipt> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::info!(
            from = %req.from_number,
            recipients = req.recipients.len(),
            "simulated text blast accepted"
        );
        Ok(BlastReceipt {
            accepted: req.recipients.len(),
        })
    }
}

/// Waits, then drops the record. Settings live only as long as the process.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedSettingsSink {
    delay: Duration,
}

impl SimulatedSettingsSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSettingsSink {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DELAY)
    }
}

#[async_trait]
impl SettingsSink for SimulatedSettingsSink {
    async fn persist(&self, _record: &SettingsRecord) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::debug!("settings save simulated; nothing persisted");
        Ok(())
    }
}

/// Backend double holding its own list of mappings.
#[derive(Debug)]
pub struct InMemoryGateway {
    numbers: Mutex<Vec<NumberMapping>>,
}

impl InMemoryGateway {
    pub fn new(numbers: Vec<NumberMapping>) -> Self {
        Self {
            numbers: Mutex::new(numbers),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed::number_mappings())
    }
}

#[async_trait]
impl NumberGateway for InMemoryGateway {
    async fn list_numbers(&self) -> Result<Vec<NumberMapping>> {
        Ok(self.numbers.lock().await.clone())
    }

    async fn add_number(&self, req: AddNumberRequest) -> Result<NumberMapping> {
        let mut numbers = self.numbers.lock().await;
        let id = next_id(numbers.iter().map(|m| m.id))
            .map_err(|e| Error::Remote(format!("add-number rejected: {e}")))?;
        let record = NumberMapping {
            id,
            phone_number: req.phone_number,
            audio_url: placeholder_audio_url(id),
            text_content: req.text_content,
            created_at: Utc::now(),
        };
        numbers.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AudioAttachment;

    #[tokio::test]
    async fn dispatcher_reports_recipient_count() {
        let receipt = SimulatedDispatcher::new(Duration::ZERO)
            .dispatch(BlastRequest {
                from_number: "+19296596292".to_string(),
                body: "hello".to_string(),
                recipients: vec!["+1".to_string(), "+2".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(receipt.accepted, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatcher_waits_for_its_delay() {
        let started = tokio::time::Instant::now();
        SimulatedDispatcher::default()
            .dispatch(BlastRequest {
                from_number: String::new(),
                body: "x".to_string(),
                recipients: Vec::new(),
            })
            .await
            .unwrap();
        assert!(started.elapsed() >= DEFAULT_BLAST_DELAY);
    }

    #[tokio::test]
    async fn in_memory_gateway_issues_next_id() {
        let gw = InMemoryGateway::seeded();
        let req = AddNumberRequest::new(
            "+15550001111",
            "Thanks!",
            Some(&AudioAttachment::new("a.mp3", vec![0])),
        )
        .unwrap();

        let rec = gw.add_number(req).await.unwrap();
        assert_eq!(rec.id, 3);
        assert_eq!(rec.audio_url, "https://example.com/audio3.mp3");
        assert_eq!(gw.list_numbers().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn in_memory_gateway_rejects_when_ids_run_out() {
        let mut top = seed::number_mappings().remove(0);
        top.id = u64::MAX;
        let gw = InMemoryGateway::new(vec![top]);
        let req = AddNumberRequest::new(
            "+15550001111",
            "Thanks!",
            Some(&AudioAttachment::new("a.mp3", vec![0])),
        )
        .unwrap();

        assert!(matches!(gw.add_number(req).await, Err(Error::Remote(_))));
        assert_eq!(gw.list_numbers().await.unwrap().len(), 1);
    }
}
