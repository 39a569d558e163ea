//! Masking of cardholder and contact data.
//!
//! Nothing rendered by the console shows more than the last four digits of a
//! card, account or phone number.

use std::sync::OnceLock;

use regex::Regex;

use super::format::NOT_AVAILABLE;

/// Keep only the last four characters of a value
fn last4(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

/// Mask a card number, showing only the last 4 digits ("**** **** **** 1234")
pub fn mask_card_number(card_number: Option<&str>) -> String {
    match card_number {
        Some(n) if !n.is_empty() => format!("**** **** **** {}", last4(n)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Mask a bank account number ("****1234")
pub fn mask_account_number(account_number: Option<&str>) -> String {
    match account_number {
        Some(n) if !n.is_empty() => format!("****{}", last4(n)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Mask the local part of an email address, keeping its first and last character
pub fn mask_email(email: Option<&str>) -> String {
    let email = match email {
        Some(e) if !e.is_empty() => e,
        _ => return NOT_AVAILABLE.to_string(),
    };

    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    let chars: Vec<char> = local.chars().collect();
    let masked = match chars.len() {
        0 => "*".to_string(),
        1 | 2 => format!("{}*", chars[0]),
        n => format!("{}{}{}", chars[0], "*".repeat(n - 2), chars[n - 1]),
    };

    format!("{}@{}", masked, domain)
}

/// Mask a phone number, showing only the last 4 digits ("***-***-7890")
pub fn mask_phone(phone: Option<&str>) -> String {
    match phone {
        Some(p) if !p.is_empty() => {
            let digits: String = p.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("***-***-{}", last4(&digits))
        }
        _ => NOT_AVAILABLE.to_string(),
    }
}

struct RedactionPatterns {
    card: Regex,
    ssn: Regex,
    cvv: Regex,
}

fn patterns() -> &'static RedactionPatterns {
    static PATTERNS: OnceLock<RedactionPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RedactionPatterns {
        card: Regex::new(r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b").expect("valid card regex"),
        ssn: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid ssn regex"),
        cvv: Regex::new(r"(?i)\b(cvv|cvc|security code):\s*\d{3,4}\b").expect("valid cvv regex"),
    })
}

/// Redact card numbers, SSNs and CVV codes embedded in free text
pub fn redact_sensitive_info(text: &str) -> String {
    let p = patterns();
    let text = p.card.replace_all(text, "**** **** **** ****");
    let text = p.ssn.replace_all(&text, "***-**-****");
    p.cvv.replace_all(&text, "$1: ***").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_card_number() {
        assert_eq!(mask_card_number(Some("4242")), "**** **** **** 4242");
        assert_eq!(mask_card_number(Some("4111111111111111")), "**** **** **** 1111");
        assert_eq!(mask_card_number(None), "N/A");
        assert_eq!(mask_card_number(Some("")), "N/A");
    }

    #[test]
    fn test_mask_account_number() {
        assert_eq!(mask_account_number(Some("1234")), "****1234");
        assert_eq!(mask_account_number(Some("000123456789")), "****6789");
        assert_eq!(mask_account_number(None), "N/A");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email(Some("john.doe@example.com")), "j******e@example.com");
        assert_eq!(mask_email(Some("jo@example.com")), "j*@example.com");
        assert_eq!(mask_email(Some("not-an-email")), "not-an-email");
        assert_eq!(mask_email(None), "N/A");
    }

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone(Some("+1234567890")), "***-***-7890");
        assert_eq!(mask_phone(Some("(555) 123-4567")), "***-***-4567");
        assert_eq!(mask_phone(Some("12")), "***-***-12");
        assert_eq!(mask_phone(None), "N/A");
    }

    #[test]
    fn test_redact_sensitive_info() {
        assert_eq!(
            redact_sensitive_info("card 4111 1111 1111 1111 declined"),
            "card **** **** **** **** declined"
        );
        assert_eq!(redact_sensitive_info("ssn 123-45-6789"), "ssn ***-**-****");
        assert_eq!(redact_sensitive_info("CVV: 123 given"), "CVV: *** given");
        assert_eq!(redact_sensitive_info("nothing here"), "nothing here");
    }
}
