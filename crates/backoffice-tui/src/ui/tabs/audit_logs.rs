use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use backoffice_core::utils::{format_date, redact_sensitive_info, truncate_string, NOT_AVAILABLE};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, filter_label, filter_spans, loading_suffix, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.audit_logs.as_ref() else {
        render_loading(frame, area, "Audit Logs");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(area);

    let header = filter_spans("a", "Action", filter_label(app.audit_query.action.clone()));
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let rows: Vec<Row> = view
        .data
        .iter()
        .map(|log| {
            Row::new(vec![
                Cell::from(log.log_id.clone()),
                Cell::from(or_na(&log.admin_email)),
                Cell::from(log.action.clone()),
                Cell::from(truncate_string(&redact_sensitive_info(&log.description), 36)),
                Cell::from(or_na(&log.ip_address)),
                Cell::from(Span::styled(
                    log.status.label(),
                    styles::audit_status_style(log.status),
                )),
                Cell::from(
                    log.timestamp
                        .as_deref()
                        .map(format_date)
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ),
            ])
        })
        .collect();

    let title = format!(
        " Audit Logs ({}){} ",
        view.data.len(),
        loading_suffix(app.is_loading(Tab::AuditLogs))
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(22),
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(15),
            Constraint::Length(8),
            Constraint::Length(13),
        ],
    )
    .header(
        Row::new(vec![
            "ID", "Admin", "Action", "Description", "IP Address", "Status", "Time",
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

    // Full entry for the selected row
    let detail = match view.data.get(app.selection) {
        Some(log) => vec![
            Line::from(vec![
                Span::styled("Agent: ", styles::muted_style()),
                Span::raw(or_na(&log.user_agent)),
            ]),
            Line::from(redact_sensitive_info(&log.description)),
        ],
        None => vec![Line::from(Span::styled(
            "No entries for this action",
            styles::muted_style(),
        ))],
    };
    frame.render_widget(
        Paragraph::new(detail)
            .block(block(" Entry ".to_string()))
            .wrap(Wrap { trim: true }),
        chunks[2],
    );
}
