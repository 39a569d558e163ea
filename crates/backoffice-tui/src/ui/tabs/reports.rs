use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use backoffice_core::models::{ReportStatus, ReportType};
use backoffice_core::utils::{format_date, NOT_AVAILABLE};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, loading_suffix, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.reports.as_ref() else {
        render_loading(frame, area, "Reports");
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    // Generation panel: type picker plus the generate action
    let mut picker = vec![Span::styled(" [t] Type: ", styles::muted_style())];
    for kind in ReportType::GENERATABLE {
        let style = if kind == app.report_type {
            styles::tab_style(true)
        } else {
            styles::muted_style()
        };
        picker.push(Span::styled(kind.label(), style));
        picker.push(Span::raw("  "));
    }
    picker.push(Span::styled("   [g] ", styles::help_key_style()));
    picker.push(Span::styled(
        if app.generating_report {
            "Generating..."
        } else {
            "Generate report"
        },
        styles::help_desc_style(),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(picker)).block(block(" Generate ".to_string())),
        chunks[0],
    );

    let rows: Vec<Row> = view
        .data
        .iter()
        .map(|report| {
            Row::new(vec![
                Cell::from(report.id.clone()),
                Cell::from(report.name.clone()),
                Cell::from(report.kind.label()),
                Cell::from(
                    report
                        .date
                        .as_deref()
                        .map(format_date)
                        .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                ),
                Cell::from(report.size.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(Span::styled(
                    status_label(report.status),
                    styles::report_status_style(report.status),
                )),
            ])
        })
        .collect();

    let title = format!(
        " Reports ({}){} ",
        view.data.len(),
        loading_suffix(app.is_loading(Tab::Reports))
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(16),
            Constraint::Min(24),
            Constraint::Length(14),
            Constraint::Length(13),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Name", "Type", "Date", "Size", "Status"])
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

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Completed => "Completed",
        ReportStatus::Pending => "Pending",
        ReportStatus::Failed => "Failed",
    }
}
