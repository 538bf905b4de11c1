//! liveboard — a live terminal dashboard for a community jobs & services
//! platform.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────────┐   AppMsg    ┌──────────┐  draw()  ┌──────────┐
//! │ coordinator.rs  │ ──────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio tasks)   │  (channel)  │ (state)  │          │ (render) │
//! └───────┬─────────┘             └──────────┘          └──────────┘
//!         │ fetch_json()               ▲
//!   ┌─────▼─────┐                      │ handle_key_event()
//!   │ fetch.rs  │                 ┌──────────┐
//!   └───────────┘                 │ input.rs │
//!   chat.rs posts one-shot        └──────────┘
//!   messages the same way.
//! ```
//!
//! * **`coordinator`** — polls the named backend feeds on a fixed cadence.
//! * **`fetch`** — JSON GET with a normalised error taxonomy; injectable.
//! * **`panel/`** — per-panel row types and presentation helpers.
//! * **`chat`** — request/response client for the platform chatbot.
//! * **`notify`** — transient auto-dismissing notices.
//! * **`app`** — owns all application state (rows, selections, transcript).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations and `Command`s.
//! * **`main`** — wires everything together: config, terminal, event loop.

mod app;
mod chat;
mod coordinator;
mod fetch;
mod input;
mod notify;
mod panel;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::info;

use app::{App, AppMsg, PanelFlags};
use chat::ChatClient;
use coordinator::{CoordinatorConfig, UpdateCoordinator};
use fetch::HttpFetcher;
use input::Command;
use notify::Severity;
use panel::{DirectoryPayload, MapPin, PendingDocument, UserRow};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.  This prevents the common TUI bug where a panic leaves the
/// terminal in a broken state.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Configuration helpers
// ---------------------------------------------------------------------------

/// Parse an environment variable, falling back to `default` when the variable
/// is unset or malformed.
fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Log to the file named by `LIVEBOARD_LOG`, if set. The terminal itself is
/// owned by the dashboard, so there is nowhere else for log lines to go.
fn init_tracing() {
    let Ok(path) = std::env::var("LIVEBOARD_LOG") else {
        return;
    };
    match std::fs::File::create(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(err) => eprintln!("liveboard: cannot open log file {path}: {err}"),
    }
}

/// Build a feed callback that decodes the payload into `T` and forwards it to
/// the UI channel, reporting a shape mismatch like any other failed cycle.
fn decoded_feed<T, F>(
    tx: &UnboundedSender<AppMsg>,
    key: &'static str,
    wrap: F,
) -> impl Fn(Value) + Send + Sync + 'static
where
    T: DeserializeOwned,
    F: Fn(T) -> AppMsg + Send + Sync + 'static,
{
    let tx = tx.clone();
    move |payload| match serde_json::from_value::<T>(payload) {
        Ok(decoded) => {
            let _ = tx.send(wrap(decoded));
        }
        Err(err) => {
            let _ = tx.send(AppMsg::FeedFailed {
                key: key.to_string(),
                detail: format!("unexpected payload shape: {err}"),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    install_panic_hook();

    // -- parse arguments -----------------------------------------------------
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:5000".into());
    let base_url = base_url.trim_end_matches('/').to_string();
    let interval_ms: u64 = env_parse("LIVEBOARD_UPDATE_MS", 30_000);

    // -- async runtime for polling and chat ----------------------------------
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    // -- configure the update coordinator ------------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel();
    let fetcher = Arc::new(HttpFetcher::new()?);
    let flags = PanelFlags::new();

    let error_tx = tx.clone();
    let config = CoordinatorConfig::new()
        .update_interval(Duration::from_millis(interval_ms))
        .on_error(move |key, err| {
            let _ = error_tx.send(AppMsg::FeedFailed {
                key: key.to_string(),
                detail: err.to_string(),
            });
        })
        .feed(
            "users",
            format!("{base_url}/admin/users/list"),
            Some(flags.users.clone()),
            decoded_feed::<Vec<UserRow>, _>(&tx, "users", AppMsg::Users),
        )
        .feed(
            "documents",
            format!("{base_url}/admin/documents/pending"),
            Some(flags.documents.clone()),
            decoded_feed::<Vec<PendingDocument>, _>(&tx, "documents", AppMsg::Documents),
        )
        .feed(
            "businesses",
            format!("{base_url}/api/search-businesses"),
            Some(flags.businesses.clone()),
            decoded_feed::<DirectoryPayload, _>(&tx, "businesses", AppMsg::Businesses),
        )
        .feed(
            "jobs",
            format!("{base_url}/api/map/jobs"),
            Some(flags.jobs.clone()),
            decoded_feed::<Vec<MapPin>, _>(&tx, "jobs", AppMsg::Jobs),
        )
        .feed(
            "services",
            format!("{base_url}/api/map/services"),
            Some(flags.services.clone()),
            decoded_feed::<Vec<MapPin>, _>(&tx, "services", AppMsg::Services),
        );

    let mut coordinator = UpdateCoordinator::configure(config, fetcher, runtime.handle().clone());
    coordinator.start();

    let chat = ChatClient::new(&base_url)?;

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(flags);
    app.notices
        .push("liveboard", format!("Polling {base_url}"), Severity::Info);
    info!(%base_url, interval_ms, "liveboard started");

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain feed/chat messages and expire old notices.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate) and run
    //      any side effects the keypress asked for.
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process messages
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg);
        }
        app.notices.prune(Instant::now());
        app.polling = coordinator.is_running();

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = input::handle_key_event(&mut app, key) {
                    match command {
                        Command::Refresh(keys) => {
                            for key in keys {
                                coordinator.refresh_one(key);
                            }
                        }
                        Command::TogglePolling => {
                            if coordinator.is_running() {
                                coordinator.stop();
                                app.notices
                                    .push("Updates", "Polling paused", Severity::Warning);
                            } else {
                                coordinator.start();
                                app.notices
                                    .push("Updates", "Polling resumed", Severity::Success);
                            }
                        }
                        Command::SendChat(text) => {
                            let chat = chat.clone();
                            let reply_tx = tx.clone();
                            runtime.spawn(async move {
                                let msg = match chat.send(&text).await {
                                    Ok(reply) => AppMsg::ChatReply(reply),
                                    Err(err) => AppMsg::ChatFailed(err.to_string()),
                                };
                                let _ = reply_tx.send(msg);
                            });
                        }
                    }
                }
            }
        }

        if app.quit {
            break;
        }
    }

    coordinator.stop();

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
