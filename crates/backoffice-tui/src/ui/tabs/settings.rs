use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use backoffice_core::config::TokenBackend;
use backoffice_core::utils::{format_countdown, NOT_AVAILABLE};

use crate::app::App;
use crate::ui::styles;

use super::block;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    render_session(frame, app, chunks[0]);
    render_notifications(frame, app, chunks[1]);
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<22}", label), styles::muted_style()),
        Span::styled(value, styles::list_item_style()),
    ])
}

fn render_session(frame: &mut Frame, app: &App, area: Rect) {
    let policy = &app.settings.policy;
    let principal = app.principal();

    let lines = vec![
        field(
            "Signed in as",
            principal
                .as_ref()
                .map(|p| format!("{} <{}>", p.display_name(), p.email))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        field(
            "Role",
            principal
                .as_ref()
                .map(|p| p.role.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        field(
            "Mode",
            if app.is_demo() { "Demo" } else { "Live" }.to_string(),
        ),
        field(
            "API base URL",
            app.settings
                .api_base_url
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ),
        field(
            "Session timeout",
            format!("{} minutes", policy.ttl.num_minutes()),
        ),
        field(
            "Expiry check",
            format!("every {}s", policy.check_interval.as_secs()),
        ),
        field(
            "Time remaining",
            app.remaining()
                .map(format_countdown)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ),
        field(
            "Token storage",
            match app.settings.token_backend {
                TokenBackend::Keyring => "OS keyring",
                TokenBackend::File => "Cache file",
            }
            .to_string(),
        ),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(block(" Session ".to_string())),
        area,
    );
}

fn render_notifications(frame: &mut Frame, app: &App, area: Rect) {
    let toggles = [
        ("Email notifications", app.preferences.email_notifications),
        ("Security alerts", app.preferences.security_alerts),
    ];

    let mut lines: Vec<Line> = toggles
        .iter()
        .enumerate()
        .map(|(i, (label, enabled))| {
            let style = if i == app.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let (mark, mark_style) = if *enabled {
                ("[x]", styles::success_style())
            } else {
                ("[ ]", styles::muted_style())
            };
            Line::from(vec![
                Span::raw("  "),
                Span::styled(mark, mark_style),
                Span::styled(format!(" {}", label), style),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Enter] toggle selected",
        styles::muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(block(" Notifications ".to_string())),
        area,
    );
}
