//! Combined-statement splitter.
//!
//! A single SMS can carry many transactions as bracketed sub-records:
//!   TFH12ABC34 Confirmed. [20240605; ;Bundle Purchase;SAFARICOM;50.00]Completed[...]Completed
//! Each sub-record becomes one transaction with id "{reference}-{n}".

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use pesa_core::normalize::{parse_amount, start_of_day};
use pesa_core::{Error, Format, Result, Source, Transaction, TxType};
use regex::Regex;
use tracing::{debug, warn};

use super::format::leading_reference;
use crate::category_rules::statement_category;
use crate::types::CombinedStatementBlock;

/// Fixed: there is no balance in the message to corroborate amounts.
pub const COMBINED_CONFIDENCE: f64 = 0.8;

static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(\d{8});\s*;([^;\]]*);([^;\]]*);([^;\]]*)\]\s*completed")
        .expect("valid block regex")
});

/// Split a combined message into its sub-records, in order of appearance.
pub fn split_blocks(text: &str) -> Vec<CombinedStatementBlock> {
    BLOCK
        .captures_iter(text)
        .map(|caps| {
            let date_code = caps[1].to_string();
            let raw_amount = caps[4].trim();
            let amount = parse_amount(raw_amount).unwrap_or_else(|| {
                warn!(raw = %raw_amount, "malformed amount in combined sub-record; using 0");
                0.0
            });
            CombinedStatementBlock {
                date: NaiveDate::parse_from_str(&date_code, "%Y%m%d").ok(),
                date_code,
                description: caps[2].trim().to_string(),
                counterparty: caps[3].trim().to_string(),
                amount,
            }
        })
        .collect()
}

fn tx_type_for(description: &str) -> TxType {
    if description.to_lowercase().contains("transfer") {
        TxType::Sent
    } else {
        TxType::Payment
    }
}

/// Parse a message already classified as a combined statement.
///
/// Sub-records whose date does not parse are skipped; numbering follows
/// appearance order so ids stay stable.
pub fn parse_combined(text: &str) -> Result<(String, Vec<Transaction>)> {
    let reference = leading_reference(text)
        .ok_or(Error::UnsupportedFormat)?
        .to_ascii_uppercase();

    let blocks = split_blocks(text);
    let mut out = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.into_iter().enumerate() {
        let Some(date) = block.date else {
            warn!(date_code = %block.date_code, index = i + 1, "skipping sub-record with invalid date");
            continue;
        };
        let txn = Transaction::new(
            format!("{}-{}", reference, i + 1),
            start_of_day(date),
            tx_type_for(&block.description),
            block.amount,
            Source::Sms,
            Format::CombinedStatement,
        )
        .with_category(statement_category(&block.description))
        .with_counterparty(block.counterparty)
        .with_description(block.description)
        .with_balance(None)
        .with_confidence(COMBINED_CONFIDENCE);
        out.push(txn);
    }

    if out.is_empty() {
        return Err(Error::NoTransactionsFound(format!(
            "combined statement {reference} has no parseable sub-records"
        )));
    }
    debug!(reference = %reference, count = out.len(), "split combined statement");
    Ok((reference, out))
}
