use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of a PDF "transaction type / paid in / paid out" summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub transaction_type: String,
    pub paid_in: f64,
    pub paid_out: f64,
}

impl SummaryLine {
    pub fn new(transaction_type: impl Into<String>, paid_in: f64, paid_out: f64) -> Self {
        Self {
            transaction_type: transaction_type.into(),
            paid_in: paid_in.max(0.0),
            paid_out: paid_out.max(0.0),
        }
    }
}

/// One bracketed sub-record of a combined-statement SMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedStatementBlock {
    pub date: Option<NaiveDate>,
    /// Raw YYYYMMDD token as it appeared in the message
    pub date_code: String,
    pub description: String,
    pub counterparty: String,
    pub amount: f64,
}

/// What the PDF engine was handed.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfInput {
    /// Rows already split by an upstream extractor
    Rows(Vec<SummaryLine>),
    /// Plain text pulled out of the PDF
    Text(String),
    /// Nothing supplied; the built-in sample table is used
    Absent,
}

/// Where summary lines came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Rows,
    Text,
    /// Demo/offline table, not real statement data
    Sample,
}

/// Machine-readable failure attached to a parse outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub kind: String,
    pub message: String,
}

impl From<&pesa_core::Error> for ParseFailure {
    fn from(e: &pesa_core::Error) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}
