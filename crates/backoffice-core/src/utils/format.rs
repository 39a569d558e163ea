use chrono::Duration;

/// Placeholder shown for missing values
pub const NOT_AVAILABLE: &str = "N/A";

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else {
        date.to_string()
    }
}

/// Insert thousands separators into a string of digits
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format an integer count with thousands separators (45678 -> "45,678")
pub fn format_count(n: u64) -> String {
    group_thousands(&n.to_string())
}

/// Format a currency amount for display.
///
/// USD, EUR and GBP get their symbol, any other code is used as a prefix.
/// Amounts are rounded to cents and grouped by thousands.
pub fn format_currency(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(&(cents / 100).to_string());
    let number = format!("{}.{:02}", whole, cents % 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    match currency.to_ascii_uppercase().as_str() {
        "USD" => format!("{}${}", sign, number),
        "EUR" => format!("{}€{}", sign, number),
        "GBP" => format!("{}£{}", sign, number),
        other => format!("{}{} {}", sign, other, number),
    }
}

/// Format a percentage with one decimal place
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Format the remaining session time as a `mm:ss` countdown.
/// Negative durations clamp to `00:00`.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Turn a wire value like `in_progress` into `In Progress`
pub fn title_case(value: &str) -> String {
    value
        .split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-01-10T10:30:00Z"), "Jan 10, 2025");
        assert_eq!(format_date("2024-03-10"), "Mar 10, 2024");
        assert_eq!(format_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(45678), "45,678");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(892450.75, "USD"), "$892,450.75");
        assert_eq!(format_currency(150.0, "usd"), "$150.00");
        assert_eq!(format_currency(19.537, "USD"), "$19.54");
        assert_eq!(format_currency(-5.5, "EUR"), "-€5.50");
        assert_eq!(format_currency(1000.0, "JPY"), "JPY 1,000.00");
        assert_eq!(format_currency(f64::NAN, "USD"), "N/A");
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::minutes(15)), "15:00");
        assert_eq!(format_countdown(Duration::seconds(61)), "01:01");
        assert_eq!(format_countdown(Duration::seconds(-4)), "00:00");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("in_progress"), "In Progress");
        assert_eq!(title_case("active"), "Active");
        assert_eq!(title_case(""), "");
    }
}
