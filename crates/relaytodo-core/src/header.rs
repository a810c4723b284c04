//! Header bar shown on authenticated screens: title, greeting, actions.

use anyhow::Result;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{KeyValueStore, SessionStore, User};
use crate::nav::{Navigator, Route};

pub const TITLE: &str = "Relay Todo";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No session is stored")]
pub struct MissingSession;

/// Buttons on the header bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    CreateTodo,
    Logout,
}

impl HeaderAction {
    pub fn label(&self) -> &'static str {
        match self {
            HeaderAction::CreateTodo => "Create Todo",
            HeaderAction::Logout => "Logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    user: User,
}

impl Header {
    pub fn load<S: KeyValueStore>(store: &SessionStore<S>) -> Result<Self, MissingSession> {
        store
            .get()
            .map(|session| Self { user: session.user })
            .ok_or(MissingSession)
    }

    /// Load the header, sending the user to the login screen when no
    /// session is stored.
    pub fn require<S: KeyValueStore>(
        store: &SessionStore<S>,
        nav: &mut Navigator,
    ) -> Option<Self> {
        match Self::load(store) {
            Ok(header) => Some(header),
            Err(e) => {
                warn!(error = %e, "Header rendered without a session, redirecting to login");
                nav.push(Route::Login);
                None
            }
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn greeting(&self) -> String {
        format!("Welcome {} 👋", self.user.username)
    }

    /// Discard the session locally and return to the entry screen.
    pub fn logout<S: KeyValueStore>(store: &mut SessionStore<S>, nav: &mut Navigator) -> Result<()> {
        store.clear()?;
        info!("Logged out");
        nav.push(Route::Login);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{MemoryStore, Session};

    fn store_with_ana() -> SessionStore<MemoryStore> {
        let mut store = SessionStore::new(MemoryStore::new());
        store
            .set(&Session::new(
                "t1",
                User {
                    id: "1".to_string(),
                    username: "ana".to_string(),
                    email: "a@a.com".to_string(),
                },
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_greeting_uses_username() {
        let header = Header::load(&store_with_ana()).unwrap();
        assert_eq!(header.greeting(), "Welcome ana 👋");
        assert_eq!(header.user().email, "a@a.com");
    }

    #[test]
    fn test_load_without_session_is_an_error() {
        let store = SessionStore::new(MemoryStore::new());
        assert_eq!(Header::load(&store), Err(MissingSession));
    }

    #[test]
    fn test_require_without_session_redirects_to_login() {
        let store = SessionStore::new(MemoryStore::new());
        let mut nav = Navigator::new(Route::Home);
        assert_eq!(Header::require(&store, &mut nav), None);
        assert_eq!(nav.current(), Route::Login);
    }

    #[test]
    fn test_logout_clears_session_and_returns_to_entry() {
        let mut store = store_with_ana();
        let mut nav = Navigator::new(Route::Home);
        Header::logout(&mut store, &mut nav).unwrap();
        assert_eq!(store.get(), None);
        assert_eq!(nav.current(), Route::Login);

        // Logging out twice is harmless
        Header::logout(&mut store, &mut nav).unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(HeaderAction::CreateTodo.label(), "Create Todo");
        assert_eq!(HeaderAction::Logout.label(), "Logout");
    }
}
