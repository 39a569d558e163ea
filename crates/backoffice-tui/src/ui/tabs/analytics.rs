use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Sparkline, Table},
    Frame,
};

use backoffice_core::models::AnalyticsReport;
use backoffice_core::utils::{format_count, format_currency, title_case};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::dashboard::{bar_value, render_series_bars};
use super::{block, filter_spans, loading_suffix, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.analytics.as_ref() else {
        render_loading(frame, area, "Analytics");
        return;
    };
    let report = &view.data;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(8),
        ])
        .split(area);

    let mut header = filter_spans("d", "Range", app.date_range.label().to_string());
    header.push(Span::styled(
        loading_suffix(app.is_loading(Tab::Analytics)),
        styles::muted_style(),
    ));
    frame.render_widget(Paragraph::new(Line::from(header)), rows[0]);

    render_summary(frame, report, rows[1]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);

    render_series_bars(
        frame,
        " Revenue by Day ".to_string(),
        &report.revenue_by_day,
        charts[0],
    );

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(charts[1]);

    render_breakdown(frame, report, side[0]);

    let growth: Vec<u64> = report.user_growth.iter().map(|p| bar_value(p.value)).collect();
    let title = match (report.user_growth.first(), report.user_growth.last()) {
        (Some(first), Some(last)) => format!(
            " User Growth ({} → {}) ",
            format_count(bar_value(first.value)),
            format_count(bar_value(last.value))
        ),
        _ => " User Growth ".to_string(),
    };
    let sparkline = Sparkline::default()
        .block(block(title))
        .data(&growth)
        .style(styles::chart_style());
    frame.render_widget(sparkline, side[1]);
}

fn render_summary(frame: &mut Frame, report: &AnalyticsReport, area: Rect) {
    let summary = &report.summary;
    let item = |label: &'static str, value: String| {
        vec![
            Span::styled(format!(" {}: ", label), styles::muted_style()),
            Span::styled(value, styles::highlight_style()),
            Span::raw("   "),
        ]
    };

    let mut spans = item("Revenue", format_currency(summary.total_revenue, "USD"));
    spans.extend(item("Transactions", format_count(summary.total_transactions)));
    spans.extend(item(
        "Average",
        format_currency(summary.average_transaction, "USD"),
    ));
    spans.extend(item("Active users", format_count(summary.active_users)));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(block(" Summary ".to_string())),
        area,
    );
}

fn render_breakdown(frame: &mut Frame, report: &AnalyticsReport, area: Rect) {
    let rows: Vec<Row> = report
        .transactions_by_type
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(title_case(&t.kind)),
                Cell::from(format_count(t.count)),
                Cell::from(format_currency(t.amount, "USD")),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(8),
            Constraint::Length(14),
        ],
    )
    .header(Row::new(vec!["Type", "Count", "Volume"]).style(styles::header_style()))
    .block(block(" Transactions by Type ".to_string()));
    frame.render_widget(table, area);
}
