use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use backoffice_core::utils::{format_date, truncate_string, NOT_AVAILABLE};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, filter_label, filter_spans, loading_suffix, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.tickets.as_ref() else {
        render_loading(frame, area, "Support Tickets");
        return;
    };
    let query = &app.ticket_query;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let mut header = filter_spans(
        "s",
        "Status",
        filter_label(query.status.map(|s| s.label())),
    );
    header.extend(filter_spans(
        "p",
        "Priority",
        filter_label(query.priority.map(|p| p.label())),
    ));
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let rows: Vec<Row> = view
        .data
        .iter()
        .map(|ticket| {
            Row::new(vec![
                Cell::from(ticket.ticket_id.clone()),
                Cell::from(truncate_string(&ticket.subject, 32)),
                Cell::from(or_na(&ticket.user_id)),
                Cell::from(Span::styled(
                    ticket.status.label(),
                    styles::ticket_status_style(ticket.status),
                )),
                Cell::from(Span::styled(
                    ticket.priority.label(),
                    styles::priority_style(ticket.priority),
                )),
                Cell::from(or_na(&ticket.category)),
                Cell::from(or_na(&ticket.assigned_to)),
                Cell::from(
                    ticket
                        .last_update
                        .as_deref()
                        .or(ticket.created_at.as_deref())
                        .map(format_date)
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ),
            ])
        })
        .collect();

    let title = format!(
        " Support Tickets ({}){} ",
        view.data.len(),
        loading_suffix(app.is_loading(Tab::Tickets))
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(13),
        ],
    )
    .header(
        Row::new(vec![
            "ID", "Subject", "User", "Status", "Priority", "Category", "Assigned", "Updated",
        ])
        .style(styles::header_style()),
    )
    .block(block(title))
    .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !view.data.is_empty() {
        state.select(Some(app.selection));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);
}
