//! Completeness score for an extracted SMS transaction.
//!
//! Base 0.5, plus 0.1 per piece of evidence, capped at 1.0. This measures
//! how much of the message was understood, not whether it is correct.

use once_cell::sync::Lazy;
use regex::Regex;

static TRANSACTION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{8,12}$").expect("valid id regex"));

static PRODUCT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bm-?pesa\b").expect("valid marker regex"));

/// Which fields were located in the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Evidence {
    pub valid_id: bool,
    pub date: bool,
    pub positive_amount: bool,
    pub balance: bool,
    pub product_marker: bool,
}

impl Evidence {
    fn hits(&self) -> u32 {
        [
            self.valid_id,
            self.date,
            self.positive_amount,
            self.balance,
            self.product_marker,
        ]
        .into_iter()
        .filter(|h| *h)
        .count() as u32
    }
}

pub fn is_valid_transaction_id(id: &str) -> bool {
    TRANSACTION_ID.is_match(id)
}

pub fn has_product_marker(text: &str) -> bool {
    PRODUCT_MARKER.is_match(text)
}

/// Score in [0.5, 1.0].
pub fn score(evidence: &Evidence) -> f64 {
    (f64::from(5 + evidence.hits()) / 10.0).min(1.0)
}
