//! Text blast: one message to every distinct caller seen in the call logs.

use std::{collections::HashSet, sync::Arc};

use crate::{
    domain::{BroadcastMessage, CallLogEntry},
    notify::{port::emit, Notice, Notifier},
    ports::{BlastDispatcher, BlastRequest},
    store::DataStore,
    Result,
};

/// Number of recipients a blast was submitted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentCount(pub usize);

/// Distinct caller numbers, in order of first appearance.
pub fn recipients<'a>(logs: impl IntoIterator<Item = &'a CallLogEntry>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for log in logs {
        if seen.insert(log.phone_number.as_str()) {
            out.push(log.phone_number.clone());
        }
    }
    out
}

/// Validate and hand one broadcast to the dispatcher.
pub async fn send(
    dispatcher: &dyn BlastDispatcher,
    message: &BroadcastMessage,
    recipients: &[String],
    from_number: &str,
) -> Result<SentCount> {
    message.validate()?;
    let receipt = dispatcher
        .dispatch(BlastRequest {
            from_number: from_number.to_string(),
            body: message.body.clone(),
            recipients: recipients.to_vec(),
        })
        .await?;
    Ok(SentCount(receipt.accepted))
}

/// Blast view: the draft message and its send action.
///
/// Recipients are derived from the store's live call logs on every call.
pub struct BlastComposer {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    dispatcher: Arc<dyn BlastDispatcher>,
    body: String,
}

impl BlastComposer {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        dispatcher: Arc<dyn BlastDispatcher>,
    ) -> Self {
        Self {
            store,
            notifier,
            dispatcher,
            body: String::new(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Whether the send button would be enabled.
    pub fn can_send(&self) -> bool {
        !self.body.trim().is_empty()
    }

    pub async fn recipients(&self) -> Vec<String> {
        self.store.with_call_logs(|logs| recipients(logs)).await
    }

    /// `42/160 characters`, limited by the configured max message length.
    pub async fn counter(&self) -> String {
        let limit = self.store.settings().await.max_message_length;
        format!("{}/{limit} characters", self.body.chars().count())
    }

    /// Send the draft to every recipient. The draft is cleared only on success.
    pub async fn send(&mut self) -> Result<SentCount> {
        let message = BroadcastMessage::new(self.body.clone());
        if let Err(e) = message.validate() {
            emit(
                self.notifier.as_ref(),
                Notice::error("Missing Message", "Please enter a message to send."),
            )
            .await;
            return Err(e);
        }

        let recipients = self.recipients().await;
        let from_number = self.store.settings().await.default_from_number;

        match send(self.dispatcher.as_ref(), &message, &recipients, &from_number).await {
            Ok(sent) => {
                tracing::info!(recipients = sent.0, "text blast sent");
                emit(
                    self.notifier.as_ref(),
                    Notice::info(
                        "Text Blast Sent!",
                        format!("Message sent to {} recipients.", sent.0),
                    ),
                )
                .await;
                self.body.clear();
                Ok(sent)
            }
            Err(e) => {
                tracing::warn!("text blast failed: {e}");
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Error", "Failed to send text blast."),
                )
                .await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::Error, notify::MemoryNotifier, ports::BlastReceipt, seed,
        settings::SettingsRecord,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingDispatcher {
        requests: Mutex<Vec<BlastRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl BlastDispatcher for RecordingDispatcher {
        async fn dispatch(&self, req: BlastRequest) -> Result<BlastReceipt> {
            if self.fail {
                return Err(Error::External("carrier rejected".to_string()));
            }
            let accepted = req.recipients.len();
            self.requests.lock().await.push(req);
            Ok(BlastReceipt { accepted })
        }
    }

    fn log(id: u64, caller: &str) -> CallLogEntry {
        CallLogEntry {
            id,
            phone_number: caller.to_string(),
            called: "+1234567890".to_string(),
            created_at: Utc::now(),
        }
    }

    fn composer(
        logs: Vec<CallLogEntry>,
        dispatcher: Arc<RecordingDispatcher>,
    ) -> (BlastComposer, Arc<MemoryNotifier>) {
        let notifier = Arc::new(MemoryNotifier::new());
        let store = Arc::new(DataStore::new(
            seed::number_mappings(),
            logs,
            SettingsRecord::default(),
        ));
        (BlastComposer::new(store, notifier.clone(), dispatcher), notifier)
    }

    #[test]
    fn seed_has_three_distinct_callers() {
        let r = recipients(&seed::call_logs());
        assert_eq!(r, vec!["+1111111111", "+2222222222", "+3333333333"]);
    }

    #[test]
    fn recipients_dedupe_in_first_seen_order() {
        let logs = vec![log(1, "+2"), log(2, "+1"), log(3, "+2"), log(4, "+3"), log(5, "+1")];
        let r = recipients(&logs);
        assert_eq!(r, vec!["+2", "+1", "+3"]);
        assert!(r.len() <= logs.len());
        assert!(recipients(&Vec::<CallLogEntry>::new()).is_empty());
    }

    #[tokio::test]
    async fn blank_message_is_rejected_without_dispatch() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (mut c, notifier) = composer(seed::call_logs(), dispatcher.clone());
        c.set_body("   ");

        assert!(!c.can_send());
        let err = c.send().await.unwrap_err();
        assert!(err.is_validation());
        assert!(dispatcher.requests.lock().await.is_empty());
        assert_eq!(notifier.last().await.unwrap().title, "Missing Message");
    }

    #[tokio::test]
    async fn send_reports_count_and_clears_body() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (mut c, notifier) = composer(seed::call_logs(), dispatcher.clone());
        c.set_body("Spring sale this weekend!");

        let sent = c.send().await.unwrap();
        assert_eq!(sent, SentCount(3));
        assert_eq!(c.body(), "");
        assert!(!c.can_send());

        let reqs = dispatcher.requests.lock().await;
        assert_eq!(reqs[0].from_number, "+19296596292");
        assert_eq!(reqs[0].body, "Spring sale this weekend!");
        assert_eq!(
            notifier.last().await.unwrap().description,
            "Message sent to 3 recipients."
        );
    }

    #[tokio::test]
    async fn recipients_follow_live_logs() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (c, _) = composer(vec![log(1, "+9"), log(2, "+9")], dispatcher);
        assert_eq!(c.recipients().await, vec!["+9"]);
    }

    #[tokio::test]
    async fn failed_dispatch_keeps_draft() {
        let dispatcher = Arc::new(RecordingDispatcher {
            fail: true,
            ..Default::default()
        });
        let (mut c, notifier) = composer(seed::call_logs(), dispatcher);
        c.set_body("hello");

        assert!(c.send().await.is_err());
        assert_eq!(c.body(), "hello");
        assert_eq!(
            notifier.last().await.unwrap().description,
            "Failed to send text blast."
        );
    }

    #[tokio::test]
    async fn counter_uses_settings_limit() {
        let (mut c, _) = composer(Vec::new(), Arc::new(RecordingDispatcher::default()));
        c.set_body("héllo");
        assert_eq!(c.counter().await, "5/160 characters");
    }
}
