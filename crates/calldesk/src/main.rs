use std::sync::Arc;

use calldesk_console::{App, ConsoleNotifier};
use calldesk_core::config::Config;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), calldesk_core::Error> {
    calldesk_core::logging::init("calldesk")?;

    let cfg = Config::load()?;
    tracing::info!(
        remote = cfg.use_remote,
        export_dir = %cfg.export_dir.display(),
        "starting calldesk"
    );

    let mut app = App::from_config(&cfg, Arc::new(ConsoleNotifier))?;

    calldesk_console::run(
        &mut app,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .map_err(|e| calldesk_core::Error::External(format!("console failed: {e}")))?;

    Ok(())
}
