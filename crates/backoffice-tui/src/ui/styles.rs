use ratatui::style::{Color, Modifier, Style};

use backoffice_core::models::{
    AuditStatus, ReportStatus, TicketPriority, TicketStatus, TransactionStatus, UserStatus,
};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn header_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Demo badge in the title bar
pub fn demo_badge_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Session countdown; red once inside the warning window
pub fn countdown_style(warning: bool) -> Style {
    if warning {
        Style::default().fg(ERROR).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(SECONDARY)
    }
}

pub fn chart_style() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn growth_style(value: f64) -> Style {
    if value < 0.0 {
        error_style()
    } else {
        success_style()
    }
}

// Status colors

pub fn user_status_style(status: UserStatus) -> Style {
    match status {
        UserStatus::Active => success_style(),
        UserStatus::Inactive => muted_style(),
        UserStatus::Suspended => error_style(),
        UserStatus::Unknown => muted_style(),
    }
}

pub fn transaction_status_style(status: TransactionStatus) -> Style {
    match status {
        TransactionStatus::Completed => success_style(),
        TransactionStatus::Pending => highlight_style(),
        TransactionStatus::Failed => error_style(),
        TransactionStatus::Cancelled | TransactionStatus::Unknown => muted_style(),
    }
}

pub fn ticket_status_style(status: TicketStatus) -> Style {
    match status {
        TicketStatus::Open => highlight_style(),
        TicketStatus::InProgress => Style::default().fg(PRIMARY),
        TicketStatus::Resolved => success_style(),
        TicketStatus::Closed | TicketStatus::Unknown => muted_style(),
    }
}

pub fn priority_style(priority: TicketPriority) -> Style {
    match priority {
        TicketPriority::Urgent => error_style().add_modifier(Modifier::BOLD),
        TicketPriority::High => error_style(),
        TicketPriority::Medium => highlight_style(),
        TicketPriority::Low => muted_style(),
    }
}

pub fn audit_status_style(status: AuditStatus) -> Style {
    match status {
        AuditStatus::Success => success_style(),
        AuditStatus::Failed => error_style(),
        AuditStatus::Warning => highlight_style(),
    }
}

pub fn report_status_style(status: ReportStatus) -> Style {
    match status {
        ReportStatus::Completed => success_style(),
        ReportStatus::Pending => highlight_style(),
        ReportStatus::Failed => error_style(),
    }
}
