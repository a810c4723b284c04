use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use relaytodo_core::auth::Field;
use relaytodo_core::header::{HeaderAction, TITLE};
use relaytodo_core::nav::Route;
use relaytodo_core::notify::ToastKind;

use crate::app::{App, AppState, LoginFocus};

use super::styles;

/// Width of the login dialog
const DIALOG_WIDTH: u16 = 46;

/// Visible characters in a form field
const FIELD_WIDTH: usize = 28;

/// Width of a toast box
const TOAST_WIDTH: u16 = 40;

pub fn render(frame: &mut Frame, app: &App) {
    match app.route() {
        Route::Login => render_login(frame, app),
        Route::SignUp => render_signup(frame),
        Route::Home => render_home(frame, app),
    }

    // Render overlays
    if matches!(app.state, AppState::CreatingTodo) {
        render_create_todo_overlay(frame);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }

    render_toasts(frame, app);
}

// ============================================================================
// Login
// ============================================================================

fn logo_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "   ╦═╗╔═╗╦  ╔═╗╦ ╦  ╔╦╗╔═╗╔╦╗╔═╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "   ╠╦╝║╣ ║  ╠═╣╚╦╝   ║ ║ ║ ║║║ ║",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "   ╩╚═╚═╝╩═╝╩ ╩ ╩    ╩ ╚═╝═╩╝╚═╝",
            styles::title_style(),
        )),
    ]
}

/// Show the tail of a value so the cursor end stays visible.
fn field_display(value: &str) -> String {
    let count = value.chars().count();
    let tail: String = value.chars().skip(count.saturating_sub(FIELD_WIDTH)).collect();
    format!("{:<width$}", tail, width = FIELD_WIDTH)
}

fn field_line(label: &'static str, display: String, focused: bool, errored: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled(format!(" {:<9}", label), styles::muted_style()),
        Span::styled("[", styles::field_border_style(focused, errored)),
        Span::styled(format!("{}{}", display, cursor), style),
        Span::styled("]", styles::field_border_style(focused, errored)),
    ])
}

fn error_line(app: &App, field: Field) -> Option<Line<'static>> {
    app.login.visible_error(field).map(|error| {
        Line::from(Span::styled(
            format!("           {}", error),
            styles::error_style(),
        ))
    })
}

fn render_login(frame: &mut Frame, app: &App) {
    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let email_focused = app.login_focus == LoginFocus::Email;
    let email_errored = app.login.visible_error(Field::Email).is_some();
    lines.push(field_line(
        "E-mail",
        field_display(app.login.email()),
        email_focused,
        email_errored,
    ));
    lines.extend(error_line(app, Field::Email));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_errored = app.login.visible_error(Field::Password).is_some();
    let masked = "*".repeat(app.login.password().chars().count());
    lines.push(field_line(
        "Password",
        field_display(&masked),
        password_focused,
        password_errored,
    ));
    lines.extend(error_line(app, Field::Password));

    // Sign in button
    lines.push(Line::from(""));
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = match (app.is_submitting(), button_focused) {
        (true, _) => " Signing in… ",
        (false, true) => " ▶ Sign in ◀ ",
        (false, false) => "   Sign in   ",
    };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    // Sign up link
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("     Don't have an account? ", styles::muted_style()),
        Span::styled(
            "sign up",
            styles::link_style(app.login_focus == LoginFocus::SignUpLink),
        ),
    ]));

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(DIALOG_WIDTH, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_signup(frame: &mut Frame) {
    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(" Create an account", styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(
            " Registration isn't available from the terminal yet.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to go back to sign in", styles::muted_style()),
        ]),
    ]);

    let area = centered_rect_fixed(DIALOG_WIDTH + 10, lines.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

// ============================================================================
// Home
// ============================================================================

fn render_home(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    let body = Paragraph::new(Line::from(vec![
        Span::styled("  Press ", styles::muted_style()),
        Span::styled("n", styles::help_key_style()),
        Span::styled(" to create a todo", styles::muted_style()),
    ]));
    frame.render_widget(body, chunks[1]);

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("  {} ◈", TITLE);
    let greeting = app
        .header
        .as_ref()
        .map(|h| h.greeting())
        .unwrap_or_default();

    let right = vec![
        Span::styled(greeting, styles::highlight_style()),
        Span::styled("  [n] ", styles::help_key_style()),
        Span::styled(HeaderAction::CreateTodo.label(), styles::help_desc_style()),
        Span::styled("  [l] ", styles::help_key_style()),
        Span::styled(HeaderAction::Logout.label(), styles::help_desc_style()),
        Span::raw("  "),
    ];
    let right_width: usize = right.iter().map(|s| s.content.chars().count()).sum();
    let padding = (area.width as usize)
        .saturating_sub(title.chars().count())
        .saturating_sub(right_width);

    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
    ];
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = " [?] help | [q]uit ";
    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => {
            let email = app
                .header
                .as_ref()
                .map(|h| h.user().email.clone())
                .unwrap_or_default();
            format!(" Signed in as {} ", email)
        }
    };

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(shortcuts.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(shortcuts, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

// ============================================================================
// Overlays
// ============================================================================

fn render_toasts(frame: &mut Frame, app: &App) {
    let now = Utc::now();
    let screen = frame.area();
    let mut y = screen.y + 1;

    for toast in app.login.notifications().active().iter().rev() {
        let width = TOAST_WIDTH.min(screen.width);
        let inner = width.saturating_sub(4) as usize;
        let text_lines = (toast.message.chars().count() / inner.max(1)) as u16 + 1;
        let height = text_lines + 3;
        if y + height > screen.y + screen.height {
            break;
        }
        let area = Rect::new(screen.x + screen.width.saturating_sub(width + 1), y, width, height);

        let style = match toast.kind {
            ToastKind::Error => styles::error_style(),
            ToastKind::Success => styles::success_style(),
            ToastKind::Info => styles::highlight_style(),
        };
        let progress_len = (toast.remaining_fraction(now) * inner as f64).round() as usize;

        let lines = vec![
            Line::from(Span::styled(toast.message.clone(), style)),
            Line::from(Span::styled("▔".repeat(progress_len), style)),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(Span::styled(" ^D ✕ ", styles::muted_style()));

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
        y += height;
    }
}

fn render_create_todo_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            format!(" {}", HeaderAction::CreateTodo.label()),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 16, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Home", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  n         ", styles::help_key_style()),
            Span::styled("Create todo", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  l         ", styles::help_key_style()),
            Span::styled("Logout", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(DIALOG_WIDTH, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_display_pads_and_keeps_tail() {
        assert_eq!(field_display("ab").chars().count(), FIELD_WIDTH);
        let long = "x".repeat(FIELD_WIDTH) + "yz";
        let shown = field_display(&long);
        assert!(shown.ends_with("yz"));
        assert_eq!(shown.chars().count(), FIELD_WIDTH);
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(46, 12, area);
        assert_eq!(rect, Rect::new(0, 0, 20, 10));

        let rect = centered_rect_fixed(10, 4, area);
        assert_eq!(rect, Rect::new(5, 3, 10, 4));
    }
}
