use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{io, sync::Arc};
use taskboard::{
    app::App,
    client::TaskClient,
    config::Settings,
    dispatch::Dispatcher,
    kanban_board::{BoardEvent, Command},
    telemetry, ui,
};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let settings = Settings::new().context("Failed to load configuration")?;
    let _guard = telemetry::init(&settings.log)?;

    let client = TaskClient::new(&settings.api.base_url()?)?;
    info!(endpoint = %client.endpoint(), "starting task board");

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::channel(100);
    let dispatcher = Dispatcher::new(Arc::new(client), tx);
    let mut app = App::new();

    let result = run_app(&mut terminal, &mut app, &dispatcher, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = %err, "terminal error");
        eprintln!("{:?}", err);
    }
    info!("task board closed");
    Ok(())
}

/// Terminal input and request completions share one loop, so every change to
/// the board happens here, one event at a time.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut mpsc::Receiver<BoardEvent>,
) -> io::Result<()> {
    let mut events = EventStream::new();
    if let Some(fetch) = app.board.initial_fetch() {
        issue(app, dispatcher, fetch);
    }

    while app.is_running {
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => {
                    if let Some(command) = app.handle_event(&event) {
                        issue(app, dispatcher, command);
                    }
                }
                Some(Err(err)) => return Err(err),
                None => break,
            },
            Some(completion) = rx.recv() => app.on_completion(completion),
        }
    }
    Ok(())
}

fn issue(app: &mut App, dispatcher: &Dispatcher, command: Command) {
    app.pending += 1;
    dispatcher.dispatch(command);
}
