use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use smartdoc_core::api::DEFAULT_TIMEOUT;
use smartdoc_core::{FileStore, HttpTransport, Session};

mod app;
mod device;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use device::TerminalFeedback;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "smartdoc")]
#[command(about = "Terminal client for the SmartDoc medical assistant")]
struct Cli {
    /// Settings file (defaults to <config dir>/smartdoc/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Give up on a request after this many seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,
    /// Don't ring the terminal bell on emergencies
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.log_dir.unwrap_or_else(logging::default_log_dir);
    let _log_guard = logging::configure_logging(&log_dir)
        .with_context(|| format!("failed to set up logging in {}", log_dir.display()))?;

    let store = match cli.config {
        Some(path) => FileStore::open(path),
        None => FileStore::open_default()?,
    };
    tracing::info!(config = %store.path().display(), "SmartDoc Assistant starting");

    let transport = HttpTransport::new(Duration::from_secs(cli.timeout_secs))?;
    let feedback = TerminalFeedback { muted: cli.mute };

    let mut session = Session::new(store, Arc::new(transport), feedback);
    session.start();
    let mut app = App::new(session);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
