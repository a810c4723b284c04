use std::fmt;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email and password as typed into the login form. Never persisted.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs and panics
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("E-mail required")]
    EmailRequired,

    #[error("Provide a valid e-mail")]
    EmailInvalid,

    #[error("Password required")]
    PasswordRequired,

    #[error("Minimum of 6 characters")]
    PasswordTooShort,
}

impl FieldError {
    pub fn field(&self) -> Field {
        match self {
            FieldError::EmailRequired | FieldError::EmailInvalid => Field::Email,
            FieldError::PasswordRequired | FieldError::PasswordTooShort => Field::Password,
        }
    }
}

/// First failing rule per field, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Option<FieldError>,
    pub password: Option<FieldError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        match field {
            Field::Email => self.email,
            Field::Password => self.password,
        }
    }
}

pub fn is_present(value: &str) -> bool {
    !value.is_empty()
}

/// Basic `local@domain.tld` shape check.
pub fn is_email_shaped(value: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(value))
}

pub fn has_min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

pub fn validate_email(email: &str) -> Option<FieldError> {
    if !is_present(email) {
        Some(FieldError::EmailRequired)
    } else if !is_email_shaped(email) {
        Some(FieldError::EmailInvalid)
    } else {
        None
    }
}

pub fn validate_password(password: &str) -> Option<FieldError> {
    if !is_present(password) {
        Some(FieldError::PasswordRequired)
    } else if !has_min_length(password, MIN_PASSWORD_LENGTH) {
        Some(FieldError::PasswordTooShort)
    } else {
        None
    }
}

/// Run every field rule. `Ok` only when both fields pass.
pub fn validate(credentials: &Credentials) -> Result<(), FieldErrors> {
    let errors = FieldErrors {
        email: validate_email(&credentials.email),
        password: validate_password(&credentials.password),
    };
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
