use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use backoffice_core::utils::{format_count, format_date, truncate_string, NOT_AVAILABLE};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, filter_label, filter_spans, loading_suffix, page_spans, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.users.as_ref() else {
        render_loading(frame, area, "Users");
        return;
    };
    let page = &view.data;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let mut header = filter_spans(
        "s",
        "Status",
        filter_label(app.user_query.status.map(|s| s.label())),
    );
    header.extend(filter_spans(
        "/",
        "Search",
        if app.user_query.search.is_empty() {
            "-".to_string()
        } else {
            app.user_query.search.clone()
        },
    ));
    header.extend(page_spans(page));
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    let rows: Vec<Row> = page
        .items
        .iter()
        .map(|user| {
            Row::new(vec![
                Cell::from(user.user_id.clone()),
                Cell::from(truncate_string(&user.name, 22)),
                Cell::from(user.masked_email()),
                Cell::from(Span::styled(
                    user.status.label(),
                    styles::user_status_style(user.status),
                )),
                Cell::from(user.total_spent_display()),
            ])
        })
        .collect();

    let title = format!(
        " Users ({}){} ",
        page.items.len(),
        loading_suffix(app.is_loading(Tab::Users))
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(14),
            Constraint::Min(18),
            Constraint::Length(10),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["ID", "Name", "Email", "Status", "Total Spent"])
            .style(styles::header_style()),
    )
    .block(block(title))
    .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !page.items.is_empty() {
        state.select(Some(app.selection));
    }
    frame.render_stateful_widget(table, body[0], &mut state);

    render_detail(frame, app, body[1]);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app
        .views
        .users
        .as_ref()
        .and_then(|v| v.data.items.get(app.selection));

    let lines = match selected {
        Some(user) => {
            let field = |label: &str, value: String| {
                Line::from(vec![
                    Span::styled(format!("{:<14}", label), styles::muted_style()),
                    Span::raw(value),
                ])
            };
            let date = |d: &Option<String>| {
                d.as_deref()
                    .map(format_date)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            vec![
                Line::from(Span::styled(user.name.clone(), styles::highlight_style())),
                Line::from(""),
                field("User ID", user.user_id.clone()),
                field("Email", user.masked_email()),
                field("Phone", user.masked_phone()),
                field("Status", user.status.label()),
                field("Joined", date(&user.join_date)),
                field("Last active", date(&user.last_active)),
                field("Transactions", format_count(user.total_transactions)),
                field("Total spent", user.total_spent_display()),
            ]
        }
        None => vec![Line::from(Span::styled(
            "No users match the current filters",
            styles::muted_style(),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).block(block(" Details ".to_string())), area);
}
