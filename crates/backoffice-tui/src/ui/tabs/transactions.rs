use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use backoffice_core::utils::{format_date, truncate_string, NOT_AVAILABLE};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, filter_label, filter_spans, loading_suffix, page_spans, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.transactions.as_ref() else {
        render_loading(frame, area, "Transactions");
        return;
    };
    let page = &view.data;
    let query = &app.transaction_query;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let mut header = filter_spans("t", "Type", filter_label(query.kind.map(|k| k.label())));
    header.extend(filter_spans(
        "s",
        "Status",
        filter_label(query.status.map(|s| s.label())),
    ));
    header.extend(filter_spans(
        "/",
        "Search",
        if query.search.is_empty() {
            "-".to_string()
        } else {
            query.search.clone()
        },
    ));
    header.extend(page_spans(page));
    frame.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

    let rows: Vec<Row> = page
        .items
        .iter()
        .map(|txn| {
            let date = txn
                .created_at
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            Row::new(vec![
                Cell::from(txn.transaction_id.clone()),
                Cell::from(txn.user_id.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
                Cell::from(txn.kind.label()),
                Cell::from(txn.amount_display()),
                Cell::from(Span::styled(
                    txn.status.label(),
                    styles::transaction_status_style(txn.status),
                )),
                Cell::from(txn.instrument_display()),
                Cell::from(date),
                Cell::from(truncate_string(&txn.description, 28)),
            ])
        })
        .collect();

    let title = format!(
        " Transactions ({}){} ",
        page.items.len(),
        loading_suffix(app.is_loading(Tab::Transactions))
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(15),
            Constraint::Length(13),
            Constraint::Length(10),
            Constraint::Length(20),
            Constraint::Length(13),
            Constraint::Min(12),
        ],
    )
    .header(
        Row::new(vec![
            "ID", "User", "Type", "Amount", "Status", "Instrument", "Date", "Description",
        ])
        .style(styles::header_style()),
    )
    .block(block(title))
    .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !page.items.is_empty() {
        state.select(Some(app.selection));
    }
    frame.render_stateful_widget(table, chunks[1], &mut state);
}
