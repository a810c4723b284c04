//! Login form controller.
//!
//! The flow owns the form values, per-field errors and the toasts shown on
//! the login screen. A submit validates first and only reaches the network
//! when both fields pass:
//!
//! ```text
//! Editing -> Validating -> Submitting -> Succeeded
//!               |               |
//!               +-> Editing     +-> Editing (toast on failure)
//! ```

use tracing::{debug, error, info, warn};

use crate::api::{ApiError, AuthOutcome, Authenticator};
use crate::auth::{validate, Credentials, Field, FieldError, FieldErrors, KeyValueStore, SessionStore};
use crate::nav::{Navigator, Route};
use crate::notify::Notifications;

/// Maximum length for email input.
/// 254 is the longest address SMTP will carry.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Editing,
    Validating,
    Submitting,
    Succeeded,
}

/// What a submit attempt led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Invalid(FieldErrors),
    /// A request is already outstanding; nothing was sent
    InFlight,
    /// Session stored and redirected home
    Succeeded,
    /// Server refused the credentials
    Rejected(String),
    /// Server answered with neither a session nor an error
    Incomplete,
    /// The request itself failed
    Unavailable(String),
    /// Authenticated, but the session could not be saved
    StorageFailed(String),
}

/// Result of the one-shot check made when the login screen mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountDecision {
    Redirected,
    ShowForm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Touched {
    email: bool,
    password: bool,
}

#[derive(Debug, Clone)]
pub struct LoginFlow {
    credentials: Credentials,
    touched: Touched,
    errors: FieldErrors,
    state: LoginState,
    notifications: Notifications,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        Self::with_credentials(Credentials::default())
    }

    /// Start with prefilled values (last used email, environment).
    pub fn with_credentials(credentials: Credentials) -> Self {
        let errors = validate(&credentials).err().unwrap_or_default();
        Self {
            credentials,
            touched: Touched::default(),
            errors,
            state: LoginState::Editing,
            notifications: Notifications::new(),
        }
    }

    /// Redirect home when a session is already stored.
    pub fn on_mount<S: KeyValueStore>(
        store: &SessionStore<S>,
        nav: &mut Navigator,
    ) -> MountDecision {
        if store.get().is_some() {
            debug!("Session present, skipping login form");
            nav.push(Route::Home);
            MountDecision::Redirected
        } else {
            MountDecision::ShowForm
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn password(&self) -> &str {
        &self.credentials.password
    }

    pub fn errors(&self) -> FieldErrors {
        self.errors
    }

    pub fn is_touched(&self, field: Field) -> bool {
        match field {
            Field::Email => self.touched.email,
            Field::Password => self.touched.password,
        }
    }

    /// Errors are only shown for fields the user has left or submitted.
    pub fn visible_error(&self, field: Field) -> Option<FieldError> {
        self.is_touched(field).then(|| self.errors.get(field)).flatten()
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    // =========================================================================
    // Editing
    // =========================================================================

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.email = email.into();
        self.revalidate();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
        self.revalidate();
    }

    /// Append a typed character. Returns false if it was filtered out.
    pub fn push_char(&mut self, field: Field, c: char) -> bool {
        let value = self.value_mut(field);
        let accepted = match field {
            Field::Email => can_add_email_char(value.chars().count(), c),
            Field::Password => can_add_password_char(value.chars().count(), c),
        };
        if accepted {
            value.push(c);
            self.revalidate();
        }
        accepted
    }

    pub fn pop_char(&mut self, field: Field) {
        self.value_mut(field).pop();
        self.revalidate();
    }

    /// Mark a field as visited (the user moved focus away from it).
    pub fn touch(&mut self, field: Field) {
        match field {
            Field::Email => self.touched.email = true,
            Field::Password => self.touched.password = true,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Email => &mut self.credentials.email,
            Field::Password => &mut self.credentials.password,
        }
    }

    // Errors track the values but never block input
    fn revalidate(&mut self) {
        self.errors = validate(&self.credentials).err().unwrap_or_default();
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and, if both fields pass, enter `Submitting`.
    ///
    /// Returns the credentials to send, or the outcome that stopped the
    /// submit before any request was made.
    pub fn begin_submit(&mut self) -> Result<Credentials, SubmitOutcome> {
        if self.state == LoginState::Submitting {
            debug!("Submit ignored, request already in flight");
            return Err(SubmitOutcome::InFlight);
        }

        self.state = LoginState::Validating;
        self.touched = Touched {
            email: true,
            password: true,
        };

        if let Err(errors) = validate(&self.credentials) {
            debug!(?errors, "Login form invalid");
            self.errors = errors;
            self.state = LoginState::Editing;
            return Err(SubmitOutcome::Invalid(errors));
        }

        self.errors = FieldErrors::default();
        self.state = LoginState::Submitting;
        Ok(self.credentials.clone())
    }

    /// Apply the result of the request started by `begin_submit`.
    pub fn complete_submit<S: KeyValueStore>(
        &mut self,
        result: Result<AuthOutcome, ApiError>,
        store: &mut SessionStore<S>,
        nav: &mut Navigator,
    ) -> SubmitOutcome {
        if self.state != LoginState::Submitting {
            warn!(state = ?self.state, "Auth response arrived outside of a submit");
        }

        match result {
            Ok(AuthOutcome::Authenticated(session)) => {
                if let Err(e) = store.set(&session) {
                    error!(error = %e, "Failed to save session");
                    let message = format!("Could not save session: {}", e);
                    return self.fail(message.clone(), SubmitOutcome::StorageFailed(message));
                }
                info!(user_id = %session.user.id, "Login successful");
                self.credentials.password.clear();
                self.revalidate();
                self.state = LoginState::Succeeded;
                nav.push(Route::Home);
                SubmitOutcome::Succeeded
            }
            Ok(AuthOutcome::Rejected(message)) => {
                self.fail(message.clone(), SubmitOutcome::Rejected(message))
            }
            Ok(AuthOutcome::Incomplete) => {
                warn!("Login response carried neither a token nor an error");
                self.state = LoginState::Editing;
                SubmitOutcome::Incomplete
            }
            Err(e) => {
                error!(error = %e, "Login request failed");
                let message = e.user_message();
                self.fail(message.clone(), SubmitOutcome::Unavailable(message))
            }
        }
    }

    /// Validate, call the authenticator once, and apply the result.
    pub async fn submit<A, S>(
        &mut self,
        auth: &A,
        store: &mut SessionStore<S>,
        nav: &mut Navigator,
    ) -> SubmitOutcome
    where
        A: Authenticator,
        S: KeyValueStore,
    {
        let credentials = match self.begin_submit() {
            Ok(credentials) => credentials,
            Err(outcome) => return outcome,
        };
        let result = auth.authenticate(&credentials).await;
        self.complete_submit(result, store, nav)
    }

    /// Show the failure as a toast and hand the form back, values kept.
    fn fail(&mut self, message: String, outcome: SubmitOutcome) -> SubmitOutcome {
        self.notifications.error(message);
        self.state = LoginState::Editing;
        outcome
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
