//! Core library for the Relay Todo client.
//!
//! Provides the session store, credential validation, the GraphQL
//! authentication client and the login flow that ties them together.
//! Front ends own the event loop and rendering; everything with state
//! transitions or invariants lives here.

pub mod api;
pub mod auth;
pub mod config;
pub mod flow;
pub mod header;
pub mod nav;
pub mod notify;
