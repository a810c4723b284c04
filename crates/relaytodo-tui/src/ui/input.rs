//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use relaytodo_core::nav::Route;

use crate::app::{App, AppState, LoginFocus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle create todo modal
    if matches!(app.state, AppState::CreatingTodo) {
        if matches!(key.code, KeyCode::Esc) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match app.route() {
        Route::Login => handle_login_input(app, key),
        Route::SignUp => handle_signup_input(app, key),
        Route::Home => handle_home_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl+D dismisses the newest notification
    if key.code == KeyCode::Char('d') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.login.notifications_mut().dismiss_latest();
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.move_login_focus(app.login_focus.next());
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.move_login_focus(app.login_focus.prev());
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.move_login_focus(LoginFocus::Password),
            // Enter in the password field submits, like a browser form
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
            LoginFocus::SignUpLink => app.navigate(Route::SignUp),
        },
        KeyCode::Backspace => {
            if let Some(field) = app.login_focus.field() {
                app.login.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = app.login_focus.field() {
                app.login.push_char(field, c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_signup_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => app.navigate(Route::Login),
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
    Ok(false)
}

fn handle_home_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('n') => app.open_create_todo(),
        KeyCode::Char('l') => app.logout(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('q') | KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
    Ok(false)
}
