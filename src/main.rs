mod api;
mod app;
mod clipboard;
mod config;
mod error;
mod event;
mod route;
mod screens;
mod session;
#[cfg(test)]
mod test_support;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::http::HttpApi;
use api::worker::Worker;
use app::App;
use clipboard::TerminalClipboard;
use config::Config;
use error::AppError;
use event::{Event, EventHandler, TICK_RATE_MS};
use route::Route;
use screens::Services;
use session::SessionStore;

fn init_logging(path: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &EventHandler,
) -> io::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match events.next()? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.on_key(key),
            Event::Reply(reply) => app.on_reply(reply),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn main() -> Result<(), AppError> {
    let config = Config::parse();
    init_logging(&config.log_file)?;

    let start = Route::parse(&config.open).map_err(|source| AppError::Link {
        link: config.open.clone(),
        source,
    })?;
    let api = HttpApi::new(config.api_base_url.clone(), config.request_timeout())?;
    let identity_file = config.identity_file.clone().unwrap_or_else(SessionStore::default_path);
    let session = SessionStore::load(identity_file);
    info!(api = %config.api_base_url, start = start.path(), "starting travel quiz");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Wire the API worker into the event loop
    let event_handler = EventHandler::new(TICK_RATE_MS);
    let worker = Worker::spawn(Box::new(api), event_handler.sender());
    let services = Services::new(session, Box::new(worker), Box::new(TerminalClipboard), config.share_origin.clone());
    let mut app = App::new(services);
    app.open(start);

    let result = run(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    Ok(result?)
}
