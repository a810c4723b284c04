//! Application state management for the Relay Todo terminal client.
//!
//! This module contains the `App` struct that owns the session store, the API
//! client, navigation and the login flow, and coordinates the background
//! login request.

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use relaytodo_core::api::{ApiClient, ApiError, AuthOutcome};
use relaytodo_core::auth::{Credentials, Field, KeyValueStore, SessionStore};
use relaytodo_core::config::{Config, ENV_EMAIL, ENV_PASSWORD};
use relaytodo_core::flow::{LoginFlow, LoginState, MountDecision, SubmitOutcome};
use relaytodo_core::header::Header;
use relaytodo_core::nav::{Navigator, Route};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background login channel.
/// Only one request is outstanding at a time; a little headroom is enough.
const CHANNEL_BUFFER_SIZE: usize = 4;

// ============================================================================
// UI State Types
// ============================================================================

/// Overlay state on top of the current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    CreatingTodo,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    SignUpLink,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::SignUpLink,
            LoginFocus::SignUpLink => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::SignUpLink,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::SignUpLink => LoginFocus::Button,
        }
    }

    pub fn field(&self) -> Option<Field> {
        match self {
            LoginFocus::Email => Some(Field::Email),
            LoginFocus::Password => Some(Field::Password),
            LoginFocus::Button | LoginFocus::SignUpLink => None,
        }
    }
}

type LoginResult = Result<AuthOutcome, ApiError>;

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub store: SessionStore<Box<dyn KeyValueStore>>,
    pub api: ApiClient,
    pub nav: Navigator,

    // UI State
    pub state: AppState,
    pub status_message: Option<String>,

    // Login screen
    pub login: LoginFlow,
    pub login_focus: LoginFocus,

    // Home screen
    pub header: Option<Header>,

    // Write config changes (last email) back to disk
    persist_config: bool,

    login_tx: mpsc::Sender<LoginResult>,
    login_rx: mpsc::Receiver<LoginResult>,
}

impl App {
    /// Create a new application instance from the saved configuration
    pub fn new(config: Config) -> Result<Self> {
        let store = config.open_store()?;
        let api = ApiClient::new(config.api_url.clone(), config.request_timeout_secs)?;
        debug!(api_url = %config.api_url, "API client configured");

        let credentials = initial_credentials(&config, |key| std::env::var(key).ok());

        let mut app = Self::with_parts(config, store, api, credentials);
        app.persist_config = true;
        Ok(app)
    }

    /// Assemble an app from already-built services and mount the login screen.
    pub fn with_parts(
        config: Config,
        store: Box<dyn KeyValueStore>,
        api: ApiClient,
        credentials: Credentials,
    ) -> Self {
        let (login_tx, login_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            store: SessionStore::new(store),
            api,
            nav: Navigator::new(Route::Login),
            state: AppState::Normal,
            status_message: None,
            login: LoginFlow::with_credentials(credentials),
            login_focus: LoginFocus::Email,
            header: None,
            persist_config: false,
            login_tx,
            login_rx,
        };
        app.enter_route(Route::Login);
        app.follow_redirects();
        app
    }

    pub fn route(&self) -> Route {
        self.nav.current()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Navigate and run the destination's mount logic.
    pub fn navigate(&mut self, route: Route) {
        self.nav.push(route);
        self.follow_redirects();
    }

    fn follow_redirects(&mut self) {
        while let Some(route) = self.nav.take_redirect() {
            self.enter_route(route);
        }
    }

    fn enter_route(&mut self, route: Route) {
        debug!(path = route.path(&self.config.routes), "Entering screen");
        match route {
            Route::Login => {
                self.header = None;
                if LoginFlow::on_mount(&self.store, &mut self.nav) == MountDecision::ShowForm {
                    self.login_focus = if self.login.email().is_empty() {
                        LoginFocus::Email
                    } else {
                        LoginFocus::Password
                    };
                }
            }
            Route::Home => {
                self.header = Header::require(&self.store, &mut self.nav);
            }
            Route::SignUp => {}
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Move focus, marking the field being left as touched.
    pub fn move_login_focus(&mut self, to: LoginFocus) {
        if let Some(field) = self.login_focus.field() {
            self.login.touch(field);
        }
        self.login_focus = to;
    }

    pub fn is_submitting(&self) -> bool {
        self.login.state() == LoginState::Submitting
    }

    /// Validate the form and send the login request in the background.
    pub fn submit_login(&mut self) {
        let credentials = match self.login.begin_submit() {
            Ok(credentials) => credentials,
            Err(SubmitOutcome::Invalid(errors)) => {
                debug!(?errors, "Login form has errors");
                self.login_focus = if errors.email.is_some() {
                    LoginFocus::Email
                } else {
                    LoginFocus::Password
                };
                return;
            }
            Err(outcome) => {
                debug!(?outcome, "Login submit skipped");
                return;
            }
        };

        let api = self.api.clone();
        let tx = self.login_tx.clone();
        tokio::spawn(async move {
            let result = api.login(&credentials).await;
            if tx.send(result).await.is_err() {
                warn!("Login result dropped, receiver closed");
            }
        });
    }

    /// Apply a finished login request.
    pub fn apply_login_result(&mut self, result: LoginResult) -> SubmitOutcome {
        let outcome = self
            .login
            .complete_submit(result, &mut self.store, &mut self.nav);

        if outcome == SubmitOutcome::Succeeded {
            self.remember_email();
            self.status_message = None;
        }
        self.follow_redirects();
        outcome
    }

    fn remember_email(&mut self) {
        let email = self.login.email().to_string();
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if !self.persist_config {
            return;
        }
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Home
    // =========================================================================

    pub fn open_create_todo(&mut self) {
        self.state = AppState::CreatingTodo;
    }

    pub fn logout(&mut self) {
        match Header::logout(&mut self.store, &mut self.nav) {
            Ok(()) => {
                info!("Session cleared by user");
                self.login = LoginFlow::with_credentials(Credentials::new(
                    self.config.last_email.clone().unwrap_or_default(),
                    "",
                ));
                self.status_message = None;
            }
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.status_message = Some(format!("Logout failed: {}", e));
            }
        }
        self.follow_redirects();
    }

    // =========================================================================
    // Background work
    // =========================================================================

    /// Drain finished requests and expire old toasts.
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.login_rx.try_recv() {
            let outcome = self.apply_login_result(result);
            debug!(?outcome, "Login request finished");
        }
        self.login.notifications_mut().prune_expired(Utc::now());
    }
}

/// Form prefill: env values first, then the last email used. Empty values count as unset.
fn initial_credentials<F>(config: &Config, lookup: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    let env = |key: &str| lookup(key).filter(|v| !v.is_empty());
    Credentials::new(
        env(ENV_EMAIL)
            .or_else(|| config.last_email.clone())
            .unwrap_or_default(),
        env(ENV_PASSWORD).unwrap_or_default(),
    )
}

// ============================================================================
// Tests
// ============================================================================
