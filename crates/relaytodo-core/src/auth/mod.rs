//! Authentication module for managing sessions and login credentials.
//!
//! This module provides:
//! - `SessionStore`: token and user profile persistence over a `KeyValueStore`
//! - `MemoryStore`, `FileStore`, `KeyringStore`: storage backends
//! - `Credentials`: login form values and their validation rules
//!
//! The token and the user profile are kept under two keys, the profile as JSON.

pub mod credentials;
pub mod session;
pub mod storage;

pub use credentials::{validate, Credentials, Field, FieldError, FieldErrors};
pub use session::{Session, SessionStore, User, TOKEN_KEY, USER_KEY};
pub use storage::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
