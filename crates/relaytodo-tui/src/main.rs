//! Relay Todo - a terminal client for the Relay Todo GraphQL API.
//!
//! Signs the user in, keeps the session between runs and shows the home
//! screen. `--login`, `--logout` and `--whoami` run without the full TUI.

mod app;
mod ui;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relaytodo_core::api::ApiClient;
use relaytodo_core::auth::{Credentials, SessionStore};
use relaytodo_core::config::{Config, ENV_EMAIL, ENV_PASSWORD};
use relaytodo_core::flow::{LoginFlow, SubmitOutcome};
use relaytodo_core::header::Header;
use relaytodo_core::nav::Navigator;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file written inside the cache directory
const LOG_FILE: &str = "relaytodo.log";

/// Initialize the tracing subscriber for logging.
///
/// The TUI owns the terminal, so logs go to a file in the cache directory.
/// Use RUST_LOG to control the level (e.g., RUST_LOG=relaytodo_core=debug).
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = match config.cache_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Logging disabled: {}", e);
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

fn load_config() -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        Config::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok());
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = load_config();
    let _log_guard = init_tracing(&config);

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--login") => return login_command(config).await,
        Some("--logout") => return logout_command(&config),
        Some("--whoami") => return whoami_command(&config),
        Some(other) => {
            anyhow::bail!(
                "Unknown argument: {}\nUsage: relaytodo [--login | --logout | --whoami]",
                other
            );
        }
        None => {}
    }

    info!("Relay Todo starting");

    // Create app before touching the terminal so setup errors print normally
    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Relay Todo shutting down");
    Ok(())
}

/// Sign in from the command line and store the session.
async fn login_command(mut config: Config) -> Result<()> {
    let mut store = SessionStore::new(config.open_store()?);
    let api = ApiClient::new(config.api_url.clone(), config.request_timeout_secs)?;
    let mut nav = Navigator::default();

    if let Some(user) = store.user().filter(|_| store.is_authenticated()) {
        println!("Already signed in as {} <{}>", user.username, user.email);
        return Ok(());
    }

    let email = match std::env::var(ENV_EMAIL) {
        Ok(email) if !email.is_empty() => email,
        _ => {
            print!("E-mail: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password("Password: ")?,
    };

    let mut flow = LoginFlow::with_credentials(Credentials::new(email.clone(), password));
    let outcome = flow.submit(&api, &mut store, &mut nav).await;

    match outcome {
        SubmitOutcome::Succeeded => {
            let header = Header::load(&store)?;
            println!("{}", header.greeting());
            config.last_email = Some(email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            let messages: Vec<String> = [errors.email, errors.password]
                .into_iter()
                .flatten()
                .map(|e| e.to_string())
                .collect();
            anyhow::bail!("{}", messages.join("\n"))
        }
        SubmitOutcome::Incomplete => anyhow::bail!("Login failed: the server returned no session"),
        SubmitOutcome::Rejected(message)
        | SubmitOutcome::Unavailable(message)
        | SubmitOutcome::StorageFailed(message) => anyhow::bail!("{}", message),
        SubmitOutcome::InFlight => anyhow::bail!("A login request is already in progress"),
    }
}

/// Remove the stored session.
fn logout_command(config: &Config) -> Result<()> {
    let mut store = SessionStore::new(config.open_store()?);
    let mut nav = Navigator::default();
    Header::logout(&mut store, &mut nav)?;
    println!("Signed out");
    Ok(())
}

/// Print who the stored session belongs to.
fn whoami_command(config: &Config) -> Result<()> {
    let store = SessionStore::new(config.open_store()?);
    match Header::load(&store) {
        Ok(header) => println!("{} <{}>", header.greeting(), header.user().email),
        Err(_) => println!("Not logged in"),
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
