use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pomidor_core::{paths, Controller, Dispatcher, JsonFileStore};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};

mod app;
mod config;
mod logging;
mod ui;

use app::App;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let core_config = pomidor_core::config::load_config()?;
    let config = config::load_config()?;
    let _log_guard = logging::init(&core_config.logging.level);

    let settings_path = paths::settings_file().context("No home directory for the settings file")?;
    let store = JsonFileStore::new(settings_path);
    let dispatcher = Dispatcher::from_config(&core_config.notifications);
    let (scheduled_tx, scheduled_rx) = mpsc::unbounded_channel();
    let controller = Controller::new(Box::new(store), dispatcher, scheduled_tx);
    let app = App::new(controller, config, core_config.notifications.desktop);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, scheduled_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Exited with error");
    }
    res
}

/// Blocking crossterm reads happen on their own thread and are forwarded
/// to the event loop.
fn spawn_input_reader(tx: UnboundedSender<Event>) {
    std::thread::spawn(move || loop {
        match event::poll(Duration::from_millis(250)) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.send(ev).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            },
            Ok(false) => {
                if tx.is_closed() {
                    return;
                }
            }
            Err(_) => return,
        }
    });
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut scheduled: UnboundedReceiver<pomidor_core::Scheduled>,
) -> Result<()> {
    let (input_tx, mut input) = mpsc::unbounded_channel();
    spawn_input_reader(input_tx);
    info!("TUI started");

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            info!("Quit requested");
            return Ok(());
        }

        tokio::select! {
            Some(event) = scheduled.recv() => app.on_scheduled(event),
            ev = input.recv() => match ev {
                Some(Event::Key(key)) => app.on_key(key),
                Some(_) => {}
                None => return Ok(()),
            },
        }
    }
}
