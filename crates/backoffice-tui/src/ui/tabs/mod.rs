//! Per-view content rendering.

pub mod analytics;
pub mod audit_logs;
pub mod dashboard;
pub mod reports;
pub mod settings;
pub mod tickets;
pub mod transactions;
pub mod users;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use backoffice_core::models::Page;

use super::styles;

pub(crate) fn block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
}

/// Placeholder shown until a view's first fetch lands
pub(crate) fn render_loading(frame: &mut Frame, area: Rect, title: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        "  Loading...",
        styles::muted_style(),
    )))
    .block(block(format!(" {} ", title)));
    frame.render_widget(paragraph, area);
}

/// Filter value for a header line; `None` reads as "All"
pub(crate) fn filter_label(value: Option<String>) -> String {
    value.unwrap_or_else(|| "All".to_string())
}

/// `key: value` filter span pair for a header line
pub(crate) fn filter_spans(key: &'static str, label: &'static str, value: String) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!(" [{}] ", key), styles::help_key_style()),
        Span::styled(format!("{}: ", label), styles::muted_style()),
        Span::styled(value, styles::highlight_style()),
    ]
}

/// `(Loading)` suffix while a refetch is in flight over existing data
pub(crate) fn loading_suffix(loading: bool) -> &'static str {
    if loading {
        " (loading)"
    } else {
        ""
    }
}

/// Page position with `[`/`]` hints for the directions that have a page
pub(crate) fn page_spans<T>(page: &Page<T>) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(
        format!("   Page {} of {}", page.page, page.total_pages),
        styles::muted_style(),
    )];
    if page.has_prev() {
        spans.push(Span::styled(" [[] prev", styles::help_key_style()));
    }
    if page.has_next() {
        spans.push(Span::styled(" []] next", styles::help_key_style()));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<T>(page: &Page<T>) -> String {
        page_spans(page).iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_page_spans_hints() {
        let first = Page { items: vec![1], page: 1, total_pages: 3 };
        assert_eq!(text(&first), "   Page 1 of 3 []] next");

        let middle = Page { items: vec![1], page: 2, total_pages: 3 };
        assert_eq!(text(&middle), "   Page 2 of 3 [[] prev []] next");

        let only = Page { items: vec![1], page: 1, total_pages: 1 };
        assert_eq!(text(&only), "   Page 1 of 1");
    }
}
