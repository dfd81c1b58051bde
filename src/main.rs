mod app;
mod browser;
mod composer;
mod config;
mod media;
mod platform;
mod theme;
mod toast;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
        KeyEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::App;
use composer::PostMode;
use config::{AppConfig, LoadedConfig};
use platform::PlatformTable;
use theme::Theme;
use toast::ToastKind;

#[derive(Parser, Debug)]
#[command(name = "crosspost")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal composer for drafting social media posts across platforms")]
struct Args {
    /// Use this config file instead of ~/.config/crosspost/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the platform table as JSON and exit
    #[arg(short, long)]
    platforms: bool,

    /// Start in scheduled mode
    #[arg(short, long)]
    scheduled: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let LoadedConfig { config, warnings } = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let platforms = PlatformTable::from_entries(&config.platforms)
        .context("Invalid platform table in config")?;

    // Handle CLI-only commands
    if args.platforms {
        init_logging(&args, &config, false);
        log_config_warnings(&warnings);
        println!("{}", platforms.to_json()?);
        return Ok(());
    }

    // The TUI owns the terminal, so logs go to a file
    init_logging(&args, &config, true);
    log_config_warnings(&warnings);

    // Run TUI
    run_tui(&args, &config, platforms, &warnings).await
}

/// Priority: RUST_LOG > --debug > config log_level > info
fn init_logging(args: &Args, config: &AppConfig, to_file: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if args.debug {
        EnvFilter::new("debug")
    } else if let Some(level) = &config.log_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new("info")
    };

    let log_file = if to_file { open_log_file() } else { None };

    match log_file {
        Some(file) => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false))
            .with(filter)
            .init(),
        None if to_file => {}  // No writable log location; stay silent rather than draw over the UI
        None => tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init(),
    }
}

fn log_config_warnings(warnings: &[String]) {
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("crosspost"))
        .unwrap_or_else(std::env::temp_dir);

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Could not create log directory {}: {}", dir.display(), e);
        return None;
    }

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("crosspost.log"))
        .ok()
}

async fn run_tui(
    args: &Args,
    config: &AppConfig,
    platforms: PlatformTable,
    config_warnings: &[String],
) -> Result<()> {
    ui::init_theme(Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(config, platforms);
    if args.scheduled {
        app.composer.set_mode(PostMode::Scheduled);
    }
    if let Some(warning) = config_warnings.last() {
        app.set_toast(warning.clone(), ToastKind::Warning);
    }
    tracing::info!("Starting crosspost");

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Release previews and the toast timer before handing the terminal back
    app.shutdown();
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    // Handle key and catch any errors to prevent crashes
                    if let Err(e) = app.handle_key(key).await {
                        tracing::error!("Key handler failed: {:#}", e);
                        app.set_toast(format!("Error: {}", e), ToastKind::Error);
                    }
                }
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Apply toast expiry
        app.tick().await?;
    }
}
