//! SMS ingestion: classify, extract, score.

pub mod combined;
pub mod confidence;
pub mod extract;
pub mod format;

use chrono::{Local, NaiveDateTime};
use pesa_core::{Error, Format, Result, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::ParseFailure;

pub use format::classify;

/// Successful parse of one message.
#[derive(Debug, Clone, PartialEq)]
pub enum SmsParse {
    Single(Transaction),
    Combined {
        reference: String,
        transactions: Vec<Transaction>,
    },
}

impl SmsParse {
    pub fn into_transactions(self) -> Vec<Transaction> {
        match self {
            SmsParse::Single(t) => vec![t],
            SmsParse::Combined { transactions, .. } => transactions,
        }
    }
}

/// Total result of `parse_sms`: never an `Err`, always an explicit flag.
///
/// `transactions` lists every record produced; `transaction` is also set
/// when the message was a single-transaction format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub ok: bool,
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseFailure>,
}

/// Parse one SMS, stamping defaults with `now`.
pub fn try_parse_sms_at(text: &str, now: NaiveDateTime) -> Result<SmsParse> {
    let format = classify(text).ok_or(Error::UnsupportedFormat)?;
    debug!(?format, "classified message");

    if format == Format::CombinedStatement {
        let (reference, transactions) = combined::parse_combined(text)?;
        return Ok(SmsParse::Combined {
            reference,
            transactions,
        });
    }

    let txn = extract::extract(text, format).into_transaction(now);
    Ok(SmsParse::Single(txn))
}

pub fn try_parse_sms(text: &str) -> Result<SmsParse> {
    try_parse_sms_at(text, Local::now().naive_local())
}

pub fn parse_sms_at(text: &str, now: NaiveDateTime) -> ParseOutcome {
    let format = classify(text);
    match try_parse_sms_at(text, now) {
        Ok(parsed) => {
            let transaction = match &parsed {
                SmsParse::Single(t) => Some(t.clone()),
                SmsParse::Combined { .. } => None,
            };
            ParseOutcome {
                ok: true,
                format,
                transaction,
                transactions: parsed.into_transactions(),
                error: None,
            }
        }
        Err(e) => ParseOutcome {
            ok: false,
            format,
            transaction: None,
            transactions: Vec::new(),
            error: Some(ParseFailure::from(&e)),
        },
    }
}

/// Parse one SMS against the local clock.
pub fn parse_sms(text: &str) -> ParseOutcome {
    parse_sms_at(text, Local::now().naive_local())
}

/// Outcomes for a block of messages, one per non-blank line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<ParseOutcome>,
    pub parsed: usize,
    pub failed: usize,
    pub transaction_count: usize,
}

impl BatchOutcome {
    /// All transactions across successful messages, in input order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.outcomes
            .iter()
            .flat_map(|o| o.transactions.iter().cloned())
            .collect()
    }
}

pub fn parse_sms_batch_at(text: &str, now: NaiveDateTime) -> BatchOutcome {
    let outcomes: Vec<ParseOutcome> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| parse_sms_at(l, now))
        .collect();
    let parsed = outcomes.iter().filter(|o| o.ok).count();
    let transaction_count = outcomes.iter().map(|o| o.transactions.len()).sum();
    let failed = outcomes.len() - parsed;
    info!(parsed, failed, transaction_count, "parsed sms batch");
    BatchOutcome {
        outcomes,
        parsed,
        failed,
        transaction_count,
    }
}

/// Parse a block of messages against the local clock.
pub fn parse_sms_batch(text: &str) -> BatchOutcome {
    parse_sms_batch_at(text, Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pesa_core::TxType;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_unsupported_format_is_distinct() {
        let out = parse_sms_at("Your OTP is 123456", now());
        assert!(!out.ok);
        assert_eq!(out.format, None);
        assert_eq!(out.error.unwrap().kind, "unsupported_format");
    }

    #[test]
    fn test_single_outcome_sets_both_fields() {
        let out = parse_sms_at(
            "QWE123ABC Confirmed. You have received Ksh1,500.00 from JANE DOE 254700000000 on 5/6/24 at 2:30 PM. New M-PESA balance is Ksh10,000.00.",
            now(),
        );
        assert!(out.ok);
        assert_eq!(out.format, Some(Format::Received));
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transaction.unwrap().tx_type, TxType::Received);
    }

    #[test]
    fn test_combined_outcome() {
        let out = parse_sms_at(
            "TFH12ABC34 Confirmed. [20240605; ;Bundle Purchase;SAFARICOM;50.00]Completed[20240606; ;Customer Transfer;JOHN DOE;1,000.00]Completed",
            now(),
        );
        assert!(out.ok);
        assert!(out.transaction.is_none());
        assert_eq!(out.transactions.len(), 2);
    }

    #[test]
    fn test_combined_without_blocks_reports_no_transactions() {
        let out = parse_sms_at("TFH12ABC34 [x]Completed [y]Completed", now());
        assert!(!out.ok);
        assert_eq!(out.format, Some(Format::CombinedStatement));
        assert_eq!(out.error.unwrap().kind, "no_transactions_found");
    }

    #[test]
    fn test_batch_preserves_order_and_tallies() {
        let block = "\
QWE123ABC Confirmed. You have received Ksh100.00 from A on 5/6/24 at 2:30 PM.

Hello there
RKT4ZX81PQ Confirmed. Ksh50.00 sent to B on 6/6/24 at 9:00 AM.
";
        let batch = parse_sms_batch_at(block, now());
        assert_eq!(batch.outcomes.len(), 3);
        assert_eq!(batch.parsed, 2);
        assert_eq!(batch.failed, 1);
        let txns = batch.transactions();
        assert_eq!(txns[0].transaction_id, "QWE123ABC");
        assert_eq!(txns[1].transaction_id, "RKT4ZX81PQ");
    }

    #[test]
    fn test_batch_generates_distinct_ids() {
        let block = "\
You have received Ksh100.00 from JANE on 5/6/24 at 2:30 PM.
You have received Ksh250.00 from JOHN on 5/6/24 at 3:10 PM.
";
        let ids: Vec<String> = parse_sms_batch_at(block, now())
            .transactions()
            .into_iter()
            .map(|t| t.transaction_id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| id.starts_with("GEN-")));
        assert_ne!(ids[0], ids[1]);
    }
}
