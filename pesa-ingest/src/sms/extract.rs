//! Single-transaction field extraction.
//!
//! Each recognized format has its own amount and counterparty rule; id,
//! date and balance rules are shared. Missing fields take defaults and
//! lower the confidence score, they never fail the message.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use pesa_core::normalize::{parse_amount, parse_sms_datetime};
use pesa_core::{Format, Source, Transaction, TxType};
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::confidence::{self, Evidence};

const NUM: &str = r"([\d,]+(?:\.\d{1,2})?)";
const CUR: &str = r"(?:ksh|kes)\.?\s?";
/// Where a counterparty run stops: the "on D/M/Y" clause or the balance line.
/// Sentence ends are cut afterwards by `end_of_name`.
const STOP: &str = r"(?:\s+on\s+\d{1,2}/\d{1,2}/|\s+new\s+m-?pesa|$)";

fn compile(pattern: String) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid extraction regex")
}

static LEADING_ID: Lazy<Regex> =
    Lazy::new(|| compile(r"^\s*([A-Z0-9]{8,12})\s+confirmed".to_string()));
static MARKED_ID: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(?:transaction\s+id|m-?pesa\s+ref|ref(?:erence)?)[:.]?\s*([A-Z0-9]{8,12})\b".to_string())
});
static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    compile(r"(\d{1,2}/\d{1,2}/\d{2,4})(?:\s+at\s+(\d{1,2}:\d{2}\s*[ap]m))?".to_string())
});
static BALANCE: Lazy<Regex> = Lazy::new(|| compile(format!(r"balance\s+is\s+{CUR}{NUM}")));

static RECEIVED_AMOUNT: Lazy<Regex> = Lazy::new(|| compile(format!(r"received\s+{CUR}{NUM}")));
static SENT_AMOUNT: Lazy<Regex> = Lazy::new(|| compile(format!(r"{CUR}{NUM}\s+sent\s+to")));
static PAID_AMOUNT: Lazy<Regex> =
    Lazy::new(|| compile(format!(r"{CUR}{NUM}\s+(?:paid\s+to|buy\s+goods)")));
static WITHDRAWN_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    compile(format!(r"(?:withdrawn?\s+{CUR}{NUM})|(?:{CUR}{NUM}\s+withdrawn)"))
});
static BOUGHT_AMOUNT: Lazy<Regex> = Lazy::new(|| compile(format!(r"bought\s+{CUR}{NUM}")));

static FROM_PARTY: Lazy<Regex> = Lazy::new(|| compile(format!(r"\bfrom\s+(.+?){STOP}")));
static SENT_TO_PARTY: Lazy<Regex> = Lazy::new(|| compile(format!(r"sent\s+to\s+(.+?){STOP}")));
static PAID_TO_PARTY: Lazy<Regex> =
    Lazy::new(|| compile(format!(r"(?:paid\s+to|buy\s+goods\s+(?:at|from))\s+(.+?){STOP}")));
static AIRTIME_FOR: Lazy<Regex> = Lazy::new(|| compile(r"airtime\s+for\s+(\d{9,12})".to_string()));

/// Fields located in one message, before defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub format: Format,
    pub transaction_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub amount: Option<f64>,
    pub counterparty: Option<String>,
    pub balance: Option<f64>,
    pub product_marker: bool,
    /// First 8 hex digits of the message's SHA-256; keeps generated ids apart.
    pub fingerprint: String,
}

fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.trim().as_bytes());
    hex::encode(&digest[..4])
}

fn first_group(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().trim().to_string())
}

fn numeric_field(re: &Regex, text: &str, field: &str) -> Option<f64> {
    let raw = first_group(re, text)?;
    let value = parse_amount(&raw);
    if value.is_none() {
        warn!(field, raw = %raw, "malformed numeric token");
    }
    value
}

/// Cut a counterparty run at the first sentence end. A period after a
/// single letter is an initial and does not end the name.
fn end_of_name(run: &str) -> String {
    let mut end = run.len();
    for (i, _) in run.match_indices('.') {
        let word = run[..i].rsplit(char::is_whitespace).next().unwrap_or("");
        let at_break = run[i + 1..].chars().next().is_none_or(char::is_whitespace);
        if at_break && word.chars().count() != 1 {
            end = i;
            break;
        }
    }
    run[..end].trim().to_string()
}

fn amount_rule(format: Format) -> Option<&'static Regex> {
    match format {
        Format::Received => Some(&*RECEIVED_AMOUNT),
        Format::Sent => Some(&*SENT_AMOUNT),
        Format::BusinessPayment => Some(&*PAID_AMOUNT),
        Format::Withdrawal => Some(&*WITHDRAWN_AMOUNT),
        Format::Airtime => Some(&*BOUGHT_AMOUNT),
        _ => None,
    }
}

fn counterparty_rule(format: Format) -> Option<&'static Regex> {
    match format {
        Format::Received | Format::Withdrawal => Some(&*FROM_PARTY),
        Format::Sent => Some(&*SENT_TO_PARTY),
        Format::BusinessPayment => Some(&*PAID_TO_PARTY),
        Format::Airtime => Some(&*AIRTIME_FOR),
        _ => None,
    }
}

fn transaction_id(text: &str) -> Option<String> {
    first_group(&LEADING_ID, text)
        .or_else(|| first_group(&MARKED_ID, text))
        .map(|id| id.to_ascii_uppercase())
}

fn date_time(text: &str) -> Option<NaiveDateTime> {
    let caps = DATE_TIME.captures(text)?;
    let date = caps.get(1)?.as_str();
    let time = caps.get(2).map(|m| m.as_str());
    parse_sms_datetime(date, time)
}

/// Run the rule-set for `format` over the message.
pub fn extract(text: &str, format: Format) -> Candidate {
    let amount = amount_rule(format).and_then(|re| numeric_field(re, text, "amount"));
    let counterparty = counterparty_rule(format)
        .and_then(|re| first_group(re, text))
        .map(|run| end_of_name(&run))
        .filter(|c| !c.is_empty());

    Candidate {
        format,
        transaction_id: transaction_id(text),
        date: date_time(text),
        amount,
        counterparty,
        balance: numeric_field(&BALANCE, text, "balance"),
        product_marker: confidence::has_product_marker(text),
        fingerprint: fingerprint(text),
    }
}

fn tx_type_for(format: Format) -> TxType {
    match format {
        Format::Received => TxType::Received,
        Format::Sent => TxType::Sent,
        Format::BusinessPayment | Format::Airtime => TxType::Payment,
        Format::Withdrawal => TxType::Withdrawal,
        _ => TxType::Other,
    }
}

fn describe(format: Format, counterparty: &str) -> String {
    let label = match format {
        Format::Received => "Received from",
        Format::Sent => "Sent to",
        Format::BusinessPayment => "Paid to",
        Format::Withdrawal => "Withdrawal at",
        Format::Airtime => "Airtime purchase for",
        _ => "Transaction with",
    };
    if counterparty.is_empty() {
        label
            .rsplit_once(' ')
            .map(|(head, _)| head.to_string())
            .unwrap_or_else(|| label.to_string())
    } else {
        format!("{label} {counterparty}")
    }
}

impl Candidate {
    pub fn evidence(&self) -> Evidence {
        Evidence {
            valid_id: self
                .transaction_id
                .as_deref()
                .is_some_and(confidence::is_valid_transaction_id),
            date: self.date.is_some(),
            positive_amount: self.amount.is_some_and(|a| a > 0.0),
            balance: self.balance.is_some_and(|b| b >= 0.0),
            product_marker: self.product_marker,
        }
    }

    /// Apply field defaults and score the result.
    ///
    /// `now` stands in for a missing date. A generated id combines it with
    /// the message fingerprint.
    pub fn into_transaction(self, now: NaiveDateTime) -> Transaction {
        let score = confidence::score(&self.evidence());

        let id = self.transaction_id.unwrap_or_else(|| {
            debug!(field = "transaction_id", "field defaulted to generated id");
            format!("GEN-{}-{}", now.and_utc().timestamp_millis(), self.fingerprint)
        });
        let date = self.date.unwrap_or_else(|| {
            debug!(field = "date", "field defaulted to extraction time");
            now
        });
        let amount = self.amount.unwrap_or_else(|| {
            debug!(field = "amount", "field defaulted to 0");
            0.0
        });
        let counterparty = self.counterparty.unwrap_or_default();

        Transaction::new(id, date, tx_type_for(self.format), amount, Source::Sms, self.format)
            .with_description(describe(self.format, &counterparty))
            .with_counterparty(counterparty)
            .with_balance(self.balance)
            .with_confidence(score)
    }
}
