use async_trait::async_trait;

use crate::{notify::types::Notice, Result};

/// Port for surfacing notices to whoever drives the views (console, UI, tests).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: Notice) -> Result<()>;
}

/// Deliver a notice; a failed delivery is logged and otherwise ignored.
pub async fn emit(notifier: &dyn Notifier, notice: Notice) {
    if let Err(e) = notifier.notify(notice).await {
        tracing::warn!("failed to deliver notice: {e}");
    }
}
