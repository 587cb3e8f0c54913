//! `mailpager` - terminal IMAP mail reader.
//!
//! The UI runs on the main thread. A dedicated thread owns the IMAP session
//! and the sync loop; the two talk over a pair of channels.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod app;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::process::ExitCode;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use mailpager_core::{Config, ImapSource, MimeDecoder, SyncCommand, SyncController, SyncEvent};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{Action, App};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mailpager: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(&config)?;
    info!(?config, "starting mailpager");

    // The session's socket belongs to this runtime, so the runtime moves
    // into the sync thread along with it.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start the async runtime")?;
    let source = runtime.block_on(ImapSource::connect(&config))?;
    let controller = SyncController::new(source, MimeDecoder, &config);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let sync = spawn_sync(runtime, controller, command_rx, event_tx)?;

    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &command_tx, event_rx);
    restore_terminal(&mut terminal)?;

    // A dropped command sender ends the loop too, but only once the current
    // batch is done. Don't wait for it.
    let _ = command_tx.send(SyncCommand::Quit);
    drop(sync);
    result
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    // The terminal belongs to the UI; logs only go to a file.
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mailpager=info,mailpager_core=info,mailpager_imap=info".into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn spawn_sync(
    runtime: Runtime,
    controller: SyncController<ImapSource, MimeDecoder>,
    commands: UnboundedReceiver<SyncCommand>,
    events: UnboundedSender<SyncEvent>,
) -> anyhow::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("sync".to_string())
        .spawn(move || {
            if let Err(err) = runtime.block_on(controller.run(commands, events)) {
                error!(error = %err, "sync thread stopped");
            }
        })
        .context("cannot start the sync thread")
}

/// Leaves raw mode and the alternate screen before the default hook prints
/// the panic, so the message lands on a usable terminal.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

fn setup_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.into());
    }
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Draws, applies sync events and handles keys until the user quits or
/// synchronization fails.
fn event_loop(
    terminal: &mut Tui,
    commands: &UnboundedSender<SyncCommand>,
    mut events: UnboundedReceiver<SyncEvent>,
) -> anyhow::Result<()> {
    let mut app = App::new();
    loop {
        terminal.draw(|frame| ui::draw(frame, &mut app))?;

        while let Ok(sync_event) = events.try_recv() {
            if let Some(message) = app.apply(sync_event) {
                anyhow::bail!(message);
            }
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match app.handle_key(key) {
                Action::None => {}
                Action::Send(command) => {
                    commands
                        .send(command)
                        .context("synchronization stopped")?;
                }
                Action::Quit => return Ok(()),
            }
        }
    }
}
