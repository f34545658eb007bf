//! Console front end.
//!
//! A line-oriented shell that drives the four `calldesk-core` views, plus a
//! `Notifier` that prints notices to stdout.

use async_trait::async_trait;

use calldesk_core::{
    notify::{Notice, NoticeLevel, Notifier},
    Result,
};

pub mod app;
pub mod commands;
pub mod render;

pub use app::{run, App, Ports};

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn format(notice: &Notice) -> String {
        let marker = match notice.level {
            NoticeLevel::Info => "✔",
            NoticeLevel::Error => "✖",
        };
        format!("{marker} {}: {}", notice.title, notice.description)
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, notice: Notice) -> Result<()> {
        println!("{}", Self::format(&notice));
        Ok(())
    }
}
