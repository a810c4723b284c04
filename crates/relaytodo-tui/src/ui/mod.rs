//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Screen layout for login, sign-up and home
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling

pub mod input;
pub mod render;
pub mod styles;
