use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    notify::{port::Notifier, types::Notice},
    Result,
};

/// Notifier that keeps every notice in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.notices.lock().await.clone()
    }

    pub async fn last(&self) -> Option<Notice> {
        self.notices.lock().await.last().cloned()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notice: Notice) -> Result<()> {
        self.notices.lock().await.push(notice);
        Ok(())
    }
}
