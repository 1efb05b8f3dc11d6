//! Message format classifier.
//!
//! Rules are checked top to bottom and the first match wins. The combined
//! statement signature is tested before any single-transaction marker.

use once_cell::sync::Lazy;
use pesa_core::Format;
use regex::Regex;

static LEADING_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z0-9]{10,12})\b").expect("valid reference regex"));

type Rule = (Format, fn(&str) -> bool);

/// Ordered (format, predicate) pairs. Predicates see the lowercased text.
const RULES: &[Rule] = &[
    (Format::Received, is_received),
    (Format::Sent, is_sent),
    (Format::BusinessPayment, is_business_payment),
    (Format::Withdrawal, is_withdrawal),
    (Format::Airtime, is_airtime),
];

fn is_received(t: &str) -> bool {
    t.contains("received") && t.contains("from")
}

fn is_sent(t: &str) -> bool {
    t.contains("sent to")
}

fn is_business_payment(t: &str) -> bool {
    t.contains("paid to") || t.contains("buy goods")
}

fn is_withdrawal(t: &str) -> bool {
    t.contains("withdraw")
}

fn is_airtime(t: &str) -> bool {
    t.contains("airtime")
}

/// Leading 10-12 character alphanumeric reference, if the message starts with one.
pub fn leading_reference(text: &str) -> Option<&str> {
    LEADING_REFERENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Bulk message: reference first, several "Completed" markers, and brackets.
pub fn is_combined_statement(text: &str) -> bool {
    let lower = text.to_lowercase();
    leading_reference(text).is_some()
        && lower.matches("completed").count() > 1
        && text.contains('[')
        && text.contains(']')
}

/// Classify a raw SMS; `None` means the format is not supported.
pub fn classify(text: &str) -> Option<Format> {
    if is_combined_statement(text) {
        return Some(Format::CombinedStatement);
    }
    let lower = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, matches)| matches(&lower))
        .map(|(format, _)| *format)
}
