use std::{path::PathBuf, sync::Arc};

use chrono::Utc;

use crate::{
    csv_export::{CsvArtifact, CsvFormat},
    domain::CallLogEntry,
    notify::{port::emit, Notice, Notifier},
    store::DataStore,
    Result,
};

/// Case-insensitive substring match against caller or callee.
/// An empty term matches every entry; order is preserved.
pub fn search<'a>(
    logs: &'a [CallLogEntry],
    term: &str,
) -> impl Iterator<Item = &'a CallLogEntry> + 'a {
    let needle = term.to_lowercase();
    logs.iter().filter(move |log| matches(log, &needle))
}

fn matches(log: &CallLogEntry, needle: &str) -> bool {
    log.phone_number.to_lowercase().contains(needle) || log.called.to_lowercase().contains(needle)
}

/// Completed export: where it went and how many rows it holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub rows: usize,
}

/// Call log view: a search box over the store's logs plus CSV export.
pub struct CallLogStore {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    format: CsvFormat,
    export_dir: PathBuf,
    term: String,
}

impl CallLogStore {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        format: CsvFormat,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            notifier,
            format,
            export_dir: export_dir.into(),
            term: String::new(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    /// Entries matching `term`, recomputed from the live collection.
    pub async fn search(&self, term: &str) -> Vec<CallLogEntry> {
        self.store
            .with_call_logs(|logs| search(logs, term).cloned().collect())
            .await
    }

    /// Entries matching the current search term.
    pub async fn visible(&self) -> Vec<CallLogEntry> {
        self.search(&self.term).await
    }

    /// `Showing 2 of 3 call logs`
    pub async fn summary(&self) -> String {
        let term = self.term.as_str();
        let (shown, total) = self
            .store
            .with_call_logs(|logs| (search(logs, term).count(), logs.len()))
            .await;
        format!("Showing {shown} of {total} call logs")
    }

    /// Export the visible rows to `call-logs-<date>.csv` in the export directory.
    pub async fn export(&self) -> Result<ExportOutcome> {
        let rows = self.visible().await;
        let artifact = CsvArtifact::build(&rows, &self.format, Utc::now());

        match artifact.write_to(&self.export_dir).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), rows = artifact.rows, "call logs exported");
                emit(
                    self.notifier.as_ref(),
                    Notice::info(
                        "Export Successful",
                        format!("Exported {} call logs to CSV.", artifact.rows),
                    ),
                )
                .await;
                Ok(ExportOutcome {
                    path,
                    rows: artifact.rows,
                })
            }
            Err(e) => {
                tracing::warn!("call log export failed: {e}");
                emit(
                    self.notifier.as_ref(),
                    Notice::error("Error", "Failed to export call logs."),
                )
                .await;
                Err(e)
            }
        }
    }
}
