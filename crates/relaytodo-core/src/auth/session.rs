use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::KeyValueStore;

/// Storage key holding the raw bearer token
pub const TOKEN_KEY: &str = "@relayTodo:token";

/// Storage key holding the JSON-encoded user profile
pub const USER_KEY: &str = "@relayTodo:user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// An authenticated session: the token plus the profile it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }
}

/// Session persistence on top of a key-value backend.
///
/// The token and the user live under two separate keys, the user as JSON.
/// Both keys are written together and removed together.
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Persist the token and user. On a failed user write the token is
    /// removed again so a half-written session is never left behind.
    pub fn set(&mut self, session: &Session) -> Result<()> {
        let user_json =
            serde_json::to_string(&session.user).context("Failed to encode user profile")?;

        self.backend
            .set_item(TOKEN_KEY, &session.token)
            .context("Failed to store session token")?;

        if let Err(e) = self.backend.set_item(USER_KEY, &user_json) {
            if let Err(rollback) = self.backend.remove_item(TOKEN_KEY) {
                warn!(error = %rollback, "Failed to roll back session token");
            }
            return Err(e.context("Failed to store user profile"));
        }

        debug!(user_id = %session.user.id, "Session stored");
        Ok(())
    }

    /// Read the stored session. Missing or corrupt data reads as `None`.
    pub fn get(&self) -> Option<Session> {
        let token = self.token()?;
        let user = self.user()?;
        Some(Session { token, user })
    }

    /// Remove both session keys. Safe to call when nothing is stored.
    pub fn clear(&mut self) -> Result<()> {
        self.backend
            .remove_item(TOKEN_KEY)
            .context("Failed to remove session token")?;
        self.backend
            .remove_item(USER_KEY)
            .context("Failed to remove user profile")?;
        debug!("Session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.backend
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        let raw = self.backend.get_item(USER_KEY)?;
        match serde_json::from_str::<Option<User>>(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Stored user profile is not valid JSON");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }
}
