//! Utility functions for display formatting and masking of sensitive values.

pub mod format;
pub mod mask;

// Re-export commonly used functions at module level
pub use format::{
    format_count, format_countdown, format_currency, format_date, format_percent,
    title_case, truncate_string, NOT_AVAILABLE,
};
pub use mask::{
    mask_account_number, mask_card_number, mask_email, mask_phone, redact_sensitive_info,
};
