use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use calldesk_core::{
    blast::BlastComposer,
    call_logs::CallLogStore,
    config::Config,
    csv_export::{CsvFormat, ExportZone},
    notify::Notifier,
    ports::{BlastDispatcher, NumberGateway, SettingsSink},
    registry::NumberRegistry,
    settings::{SettingsRecord, SettingsStore},
    simulated::{InMemoryGateway, SimulatedDispatcher, SimulatedSettingsSink},
    store::DataStore,
    Result,
};
use calldesk_http::HttpGateway;

use crate::commands;

/// Collaborators injected into the views.
pub struct Ports {
    pub notifier: Arc<dyn Notifier>,
    pub gateway: Arc<dyn NumberGateway>,
    pub dispatcher: Arc<dyn BlastDispatcher>,
    pub sink: Arc<dyn SettingsSink>,
}

/// One admin session: the four views over a shared store.
pub struct App {
    pub numbers: NumberRegistry,
    pub logs: CallLogStore,
    pub blast: BlastComposer,
    pub settings: SettingsStore,
    pub(crate) gateway: Arc<dyn NumberGateway>,
    pub(crate) format: CsvFormat,
}

impl App {
    pub fn new(cfg: &Config, store: Arc<DataStore>, ports: Ports) -> Result<Self> {
        let format = CsvFormat::new(&cfg.csv_date_format, &cfg.csv_time_format, ExportZone::Local)?;

        Ok(Self {
            numbers: NumberRegistry::new(store.clone(), ports.notifier.clone()),
            logs: CallLogStore::new(
                store.clone(),
                ports.notifier.clone(),
                format.clone(),
                cfg.export_dir.clone(),
            ),
            blast: BlastComposer::new(store.clone(), ports.notifier.clone(), ports.dispatcher),
            settings: SettingsStore::new(store, ports.notifier, ports.sink),
            gateway: ports.gateway,
            format,
        })
    }

    /// Seeded session wired the way `cfg` asks: in-memory or HTTP backend,
    /// simulated blast dispatch and settings save.
    pub fn from_config(cfg: &Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let gateway: Arc<dyn NumberGateway> = if cfg.use_remote {
            tracing::info!(base_url = %cfg.api_base_url, "using remote backend");
            Arc::new(HttpGateway::new(cfg.api_base_url.clone(), cfg.http_timeout)?)
        } else {
            Arc::new(InMemoryGateway::seeded())
        };

        let store = Arc::new(DataStore::seeded(SettingsRecord::from_config(cfg)));
        Self::new(
            cfg,
            store,
            Ports {
                notifier,
                gateway,
                dispatcher: Arc::new(SimulatedDispatcher::new(cfg.blast_send_delay)),
                sink: Arc::new(SimulatedSettingsSink::new(cfg.settings_save_delay)),
            },
        )
    }
}

const BANNER: &str = "calldesk admin console. Type /help for commands.\n";

/// Read commands from `input` until EOF or `/quit`, writing replies to `output`.
pub async fn run<R, W>(app: &mut App, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(BANNER.as_bytes()).await?;
    output.flush().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = commands::handle_line(app, line).await;
        if !reply.text.is_empty() {
            output.write_all(reply.text.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.flush().await?;

        if reply.quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calldesk_core::notify::MemoryNotifier;

    #[tokio::test]
    async fn run_stops_at_quit() {
        let cfg = Config::from_lookup(|_| None).unwrap();
        let mut app = App::from_config(&cfg, Arc::new(MemoryNotifier::new())).unwrap();

        let input: &[u8] = b"/numbers\n\n/quit\n/numbers\n";
        let mut output = Vec::new();
        run(&mut app, input, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("calldesk admin console."));
        assert_eq!(text.matches("+0987654321").count(), 1);
        assert!(text.trim_end().ends_with("Bye."));
    }
}
