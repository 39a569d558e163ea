use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Paragraph, Sparkline},
    Frame,
};

use backoffice_core::models::{DashboardStats, SeriesPoint};
use backoffice_core::utils::{format_count, format_currency, format_percent};

use crate::app::{App, Tab};
use crate::ui::styles;

use super::{block, loading_suffix, render_loading};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.views.dashboard.as_ref() else {
        render_loading(frame, area, "Dashboard");
        return;
    };
    let stats = &view.data;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(8)])
        .split(area);

    render_kpis(frame, stats, rows[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let title = format!(
        " Revenue{} ",
        loading_suffix(app.is_loading(Tab::Dashboard))
    );
    render_series_bars(frame, title, &stats.revenue_data, charts[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(charts[1]);

    let activity: Vec<u64> = stats.user_activity.iter().map(|p| bar_value(p.value)).collect();
    let sparkline = Sparkline::default()
        .block(block(" User Activity ".to_string()))
        .data(&activity)
        .style(styles::chart_style());
    frame.render_widget(sparkline, side[0]);

    render_type_shares(frame, stats, side[1]);
}

fn render_kpis(frame: &mut Frame, stats: &DashboardStats, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let active_rate = stats
        .active_rate()
        .map(|r| format!("{} active", format_percent(r)))
        .unwrap_or_default();
    let average = stats
        .average_transaction()
        .map(|a| format!("avg {}", format_currency(a, "USD")))
        .unwrap_or_default();

    let kpis = [
        ("Total Users", format_count(stats.total_users), Some(stats.monthly_growth), String::new()),
        ("Active Users", format_count(stats.active_users), None, active_rate),
        (
            "Transactions",
            format_count(stats.total_transactions),
            Some(stats.transaction_growth),
            average,
        ),
        (
            "Revenue",
            format_currency(stats.total_revenue, "USD"),
            Some(stats.revenue_growth),
            format!("{} open tickets", stats.open_tickets),
        ),
    ];

    for ((label, value, growth, note), area) in kpis.into_iter().zip(cards.iter()) {
        let mut lines = vec![Line::from(Span::styled(value, styles::highlight_style()))];
        let mut second = Vec::new();
        if let Some(g) = growth {
            let sign = if g >= 0.0 { "+" } else { "" };
            second.push(Span::styled(
                format!("{}{} ", sign, format_percent(g)),
                styles::growth_style(g),
            ));
        }
        second.push(Span::styled(note, styles::muted_style()));
        lines.push(Line::from(second));

        frame.render_widget(
            Paragraph::new(lines).block(block(format!(" {} ", label))),
            *area,
        );
    }
}

/// Bar chart over a labelled series
pub(crate) fn render_series_bars(frame: &mut Frame, title: String, series: &[SeriesPoint], area: Rect) {
    if series.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("  No data", styles::muted_style())).block(block(title)),
            area,
        );
        return;
    }

    let data: Vec<(&str, u64)> = series
        .iter()
        .map(|p| (p.label.as_str(), bar_value(p.value)))
        .collect();

    // Fit the bars to the inner width
    let inner = area.width.saturating_sub(2) as usize;
    let bar_width = (inner / series.len().max(1)).saturating_sub(1).clamp(1, 9) as u16;

    let chart = BarChart::default()
        .block(block(title))
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(styles::chart_style())
        .value_style(styles::selected_style());
    frame.render_widget(chart, area);
}

fn render_type_shares(frame: &mut Frame, stats: &DashboardStats, area: Rect) {
    let shares = stats.transaction_type_percentages();
    let lines: Vec<Line> = if shares.is_empty() {
        vec![Line::from(Span::styled("No data", styles::muted_style()))]
    } else {
        shares
            .into_iter()
            .map(|(name, pct)| {
                let filled = (pct / 5.0).round() as usize;
                Line::from(vec![
                    Span::styled(format!("{:<14}", name), styles::list_item_style()),
                    Span::styled("█".repeat(filled), styles::chart_style()),
                    Span::styled(format!(" {}", format_percent(pct)), styles::muted_style()),
                ])
            })
            .collect()
    };

    frame.render_widget(
        Paragraph::new(lines).block(block(" Transaction Types ".to_string())),
        area,
    );
}

/// Chart widgets take unsigned integers
pub(crate) fn bar_value(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_value_clamps() {
        assert_eq!(bar_value(12.6), 13);
        assert_eq!(bar_value(-4.0), 0);
        assert_eq!(bar_value(f64::NAN), 0);
    }
}
