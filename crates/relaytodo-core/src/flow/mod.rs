//! UI-driven flows built on the session store and the API client.
//!
//! - `login`: the login form controller and the redirect guard

pub mod login;

pub use login::{
    can_add_email_char, can_add_password_char, LoginFlow, LoginState, MountDecision,
    SubmitOutcome,
};
