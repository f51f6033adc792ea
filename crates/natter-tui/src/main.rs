//! Terminal client for the Natter chat service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use natter_client::{ApiClient, ApiConfig};

mod app;
mod session_file;
mod ui;

use app::App;
use session_file::SessionFile;

#[derive(Parser)]
#[command(
    name = "natter",
    version,
    about = "Terminal client for the Natter chat service"
)]
struct Args {
    /// Base URL of the backend server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Seconds to wait for a server response before giving up. 0 waits
    /// forever.
    #[arg(long, default_value_t = 30)]
    request_timeout: u64,

    /// Append logs to this file. Without it logs are discarded, so they
    /// cannot corrupt the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;
    info!(server = %args.server, "starting natter");

    let config = match args.request_timeout {
        0 => ApiConfig::new(&args.server).without_timeout(),
        secs => ApiConfig::new(&args.server).with_timeout(Duration::from_secs(secs)),
    };
    let client = ApiClient::new(config)?;
    let session_file = SessionFile::new()?;

    let terminal = ratatui::init();
    let result = App::new(client, session_file).run(terminal).await;
    ratatui::restore();
    result
}
