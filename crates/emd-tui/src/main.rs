use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emd_core::{
    ChatController, CommandRecognizer, Config, HttpTransport, PreferenceStore, Theme, VoiceCapture,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "emd-chat")]
#[command(version, about = "Chat with the EMD health-insurance assistant")]
struct Cli {
    /// Backend base URL (overrides config and EMD_CHAT_URL)
    #[arg(long)]
    url: Option<String>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Use dark mode for this session without saving it
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Use light mode for this session without saving it
    #[arg(long)]
    light: bool,
}

impl Cli {
    fn theme_override(&self) -> Option<Theme> {
        match (self.dark, self.light) {
            (true, _) => Some(Theme::Dark),
            (_, true) => Some(Theme::Light),
            _ => None,
        }
    }
}

fn default_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(emd_core::config::APP_DIR)
        .join("emd-chat.log")
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    init_logging(&log_path)?;
    info!("Starting emd-chat v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_init()
        .context("loading config")?
        .with_env_overrides();
    if let Some(url) = cli.url.clone() {
        config.base_url = Some(url);
    }
    info!(base_url = %config.base_url(), "configuration loaded");

    let transport = Arc::new(HttpTransport::from_config(&config));
    let preferences = PreferenceStore::in_config_dir()?;
    let voice = match config.voice_command.as_deref().and_then(CommandRecognizer::from_command) {
        Some(recognizer) => VoiceCapture::new(Arc::new(recognizer)),
        None => VoiceCapture::unavailable(),
    };

    let controller = ChatController::new(transport, preferences, voice, &config);
    let mut app = App::new(controller, cli.theme_override());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    info!("emd-chat exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event)?,
            Some(event) = app.controller.next_event() => app.controller.handle(event),
            else => app.should_quit = true,
        }

        app.sync();
    }

    Ok(())
}
