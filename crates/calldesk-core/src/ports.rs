use async_trait::async_trait;

use crate::{
    domain::{AddNumberRequest, NumberMapping},
    settings::SettingsRecord,
    Result,
};

/// Hexagonal port for the remote calling backend.
///
/// Implemented over HTTP in `calldesk-http` and in memory in
/// [`crate::simulated::InMemoryGateway`].
#[async_trait]
pub trait NumberGateway: Send + Sync {
    async fn list_numbers(&self) -> Result<Vec<NumberMapping>>;

    /// A non-success answer must come back as `Error::Remote`, never as an
    /// empty or default record.
    async fn add_number(&self, req: AddNumberRequest) -> Result<NumberMapping>;
}

/// One broadcast submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlastRequest {
    pub from_number: String,
    pub body: String,
    pub recipients: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlastReceipt {
    pub accepted: usize,
}

/// Port for handing a text blast to whatever actually delivers it.
///
/// Per-recipient delivery status is not tracked.
#[async_trait]
pub trait BlastDispatcher: Send + Sync {
    async fn dispatch(&self, req: BlastRequest) -> Result<BlastReceipt>;
}

/// Port for persisting the settings record.
#[async_trait]
pub trait SettingsSink: Send + Sync {
    async fn persist(&self, record: &SettingsRecord) -> Result<()>;
}
