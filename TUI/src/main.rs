mod action;
mod app;
mod backend;
mod catalog;
mod command;
mod config;
mod controller;
mod ui;
mod ui_state;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use backend::{ChecklistGenerator, GeminiBackend, OfflineBackend};
use catalog::LayerCatalog;
use config::{Cli, Config};
use controller::Controller;
use ui::draw;

// One thread: generation tasks interleave with input handling at await points.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let generator: Arc<dyn ChecklistGenerator> = if cli.offline {
        info!("starting in offline mode");
        Arc::new(OfflineBackend)
    } else {
        let gemini = cli.gemini_config();
        info!(model = %gemini.model, "using Gemini checklist backend");
        Arc::new(GeminiBackend::new(gemini).context("failed to initialise checklist backend")?)
    };

    let catalog =
        Arc::new(LayerCatalog::defense_in_depth().context("invalid defense-in-depth catalog")?);
    let controller = Arc::new(Controller::with_options(
        catalog,
        generator,
        cli.controller_options(),
    ));
    let mut app = App::new(controller, Config::default(), cli.offline);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!(error = %e, "terminal loop failed");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    // The terminal owns stdout, so logs go to a file
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(app.config.tick_rate_ms));
    let mut updates = app.controller.subscribe();

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        tokio::select! {
            _ = ticker.tick() => app.tick(),
            changed = updates.changed() => {
                if changed.is_ok() {
                    let state = updates.borrow_and_update().clone();
                    app.sync_state(state);
                }
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Some(Ok(Event::Paste(text))) => app.handle_paste(&text),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
