use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use backoffice_core::utils::format_countdown;

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs;

const LOGO: [&str; 3] = [
    "   ╔╗ ╔═╗╔═╗╦╔═  ╔═╗╔═╗╔═╗╦╔═╗╔═╗",
    "   ╠╩╗╠═╣║  ╠╩╗  ║ ║╠╣ ╠╣ ║║  ║╣ ",
    "   ╚═╝╩ ╩╚═╝╩ ╩  ╚═╝╚  ╚  ╩╚═╝╚═╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::Initializing => render_initializing_overlay(frame),
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut left = vec![Span::styled("  Back Office Admin", styles::title_style())];
    if app.is_demo() {
        left.push(Span::raw("  "));
        left.push(Span::styled(" DEMO ", styles::demo_badge_style()));
    }

    let mut right = Vec::new();
    if let Some(principal) = app.principal() {
        right.push(Span::styled(
            format!("{} ({})", principal.display_name(), principal.role),
            styles::list_item_style(),
        ));
    }
    if let Some(remaining) = app.remaining() {
        let warning = app.session_warning();
        right.push(Span::styled("  Session ", styles::muted_style()));
        right.push(Span::styled(
            format_countdown(remaining),
            styles::countdown_style(warning),
        ));
        if warning {
            right.push(Span::styled("  [x] extend", styles::help_key_style()));
        }
    }
    right.push(Span::styled("  [?] Help ", styles::muted_style()));

    let used: usize = left
        .iter()
        .chain(right.iter())
        .map(|s| s.content.chars().count())
        .sum();
    let padding = (area.width as usize).saturating_sub(used + 1);

    let mut spans = left;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // Protected views render nothing without a session
    if app.principal().is_none() {
        return;
    }

    match app.current_tab {
        Tab::Dashboard => tabs::dashboard::render(frame, app, area),
        Tab::Users => tabs::users::render(frame, app, area),
        Tab::Transactions => tabs::transactions::render(frame, app, area),
        Tab::Tickets => tabs::tickets::render(frame, app, area),
        Tab::Analytics => tabs::analytics::render(frame, app, area),
        Tab::AuditLogs => tabs::audit_logs::render(frame, app, area),
        Tab::Reports => tabs::reports::render(frame, app, area),
        Tab::Settings => tabs::settings::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]efresh | [o] logout | [q]uit";

    let (left_text, left_style) = if app.state == AppState::Searching {
        (format!(" Search: {}▌", app.search_input), styles::search_style())
    } else if let Some(ref msg) = app.status_message {
        (format!(" {} ", msg), styles::muted_style())
    } else if let Some(banner) = app.views.banner(app.current_tab) {
        (format!(" {} ", banner), styles::highlight_style())
    } else {
        (String::new(), styles::muted_style())
    };

    let right_text = format!(" {} ", shortcuts);
    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|l| Line::from(Span::styled(*l, styles::title_style())))
        .collect()
}

fn help_entry(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 31, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_entry("1-8", "Switch tabs"),
        help_entry("←/→ Tab", "Prev/next tab"),
        help_entry("↑/↓", "Navigate list"),
        help_entry("[ / ]", "Prev/next page"),
        Line::from(""),
        Line::from(Span::styled(" Session", styles::highlight_style())),
        help_entry("x", "Extend session"),
        help_entry("o", "Log out"),
        help_entry("r", "Refresh current view"),
        help_entry("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Filters", styles::highlight_style())),
        help_entry("/", "Search users/transactions"),
        help_entry("s", "Cycle status filter"),
        help_entry("t", "Transaction type / report type"),
        help_entry("p", "Ticket priority"),
        help_entry("a", "Audit action"),
        help_entry("d", "Analytics date range"),
        help_entry("g", "Generate report"),
        help_entry("Enter", "Toggle setting"),
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

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let mut height = 12;
    if app.login_error.is_some() {
        height += 2;
    }
    if app.is_demo() {
        height += 1;
    }
    let area = centered_rect_fixed(50, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    let username_focused = app.login_focus == LoginFocus::Username;
    let username_style = if username_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let username_display = format!("{:<20}", tail(&app.login_username, 20));
    let cursor = if username_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(format!("{}{}", username_display, cursor), username_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.chars().count().min(20));
    let password_display = format!("{:<20}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    let label = if app.signing_in {
        "Signing in…"
    } else if button_focused {
        " ▶ Login ◀ "
    } else {
        "   Login   "
    };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if app.is_demo() {
        let demo = &app.settings.policy.demo_credentials;
        lines.push(Line::from(Span::styled(
            format!("    Demo: {} / {}", demo.identifier, demo.secret),
            styles::muted_style(),
        )));
    }

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_initializing_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "          Checking saved session...",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

/// Last `max` characters of `s`, so the cursor end of a long entry stays visible
fn tail(s: &str, max: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(max)).collect()
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "     Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("     Press ", styles::muted_style()),
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

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let r = Rect::new(0, 0, 40, 10);
        let c = centered_rect_fixed(50, 12, r);
        assert_eq!(c, Rect::new(0, 0, 40, 10));

        let c = centered_rect_fixed(20, 4, r);
        assert_eq!(c, Rect::new(10, 3, 20, 4));
    }

    #[test]
    fn test_tail_keeps_end_of_input() {
        assert_eq!(tail("short", 20), "short");
        assert_eq!(tail("admin@breakfree.com", 8), "free.com");
    }
}
