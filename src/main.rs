mod api;
mod app;
mod config;
mod search;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::{CurlClient, ImageSearch, SearchRequest};
use app::{App, Popup, Section};
use config::AppConfig;
use search::FETCH_ERROR_MESSAGE;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "imgscout")]
#[command(version)]
#[command(about = "Search and page through Unsplash images from the terminal")]
struct Args {
    /// Fetch one page of results for this term, print it as JSON and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Page to fetch with --query
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,

    /// Use this config file instead of ~/.config/imgscout/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to a file; stdout belongs to the TUI
    if let Err(e) = init_logging(args.log_file.clone()) {
        eprintln!("imgscout: logging disabled: {:#}", e);
    }

    let config = AppConfig::load(args.config.as_deref())?;
    tracing::debug!(?config, "Loaded config");

    let client = CurlClient::new(config.api_url.clone(), config.access_key.clone());

    // Handle CLI-only commands
    if let Some(query) = args.query {
        return print_page(&client, &query, args.page).await;
    }

    run_tui(client, &config)
}

fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?
        .join("imgscout");
    Ok(dir.join("imgscout.log"))
}

fn init_logging(log_file: Option<PathBuf>) -> Result<PathBuf> {
    let path = match log_file {
        Some(p) => p,
        None => default_log_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Logging to {}", path.display());
    Ok(path)
}

async fn print_page(client: &CurlClient, query: &str, page: u32) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("Search term cannot be empty");
    }

    let results = client
        .search(SearchRequest::new(query, page))
        .await
        .context(FETCH_ERROR_MESSAGE)?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn run_tui(client: CurlClient, config: &AppConfig) -> Result<()> {
    ui::init_theme(Theme::from_config(&config.theme));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(client, config);
    app.mount();

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<CurlClient>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('q')
                            if app.popup == Popup::None && app.section != Section::Search =>
                        {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                tracing::warn!("Key handling failed: {:#}", e);
                                app.set_status(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        // Apply finished fetches
        app.tick();
    }
}
