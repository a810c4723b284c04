//! GraphQL API client module for the Relay Todo server.
//!
//! This module provides the `ApiClient` for sending the login mutation,
//! the `Authenticator` trait the login flow is written against, and the
//! `AuthOutcome` each request resolves to.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthOutcome, Authenticator, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
