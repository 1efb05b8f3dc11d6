//! Error types shared by the ingest and query engines.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported message format")]
    UnsupportedFormat,

    #[error("No transactions found: {0}")]
    NoTransactionsFound(String),

    #[error("Summary table header (TRANSACTION TYPE / PAID IN / PAID OUT) not found")]
    MissingSummaryHeader,

    #[error("Transaction {id} has invalid type '{label}'")]
    InvalidTransactionType { id: String, label: String },

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Stable machine-readable tag for the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat => "unsupported_format",
            Error::NoTransactionsFound(_) => "no_transactions_found",
            Error::MissingSummaryHeader => "missing_summary_header",
            Error::InvalidTransactionType { .. } => "invalid_transaction_type",
            Error::ExternalService(_) => "external_service_failure",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Csv(_) => "csv",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct_for_parse_failures() {
        assert_eq!(Error::UnsupportedFormat.kind(), "unsupported_format");
        assert_eq!(
            Error::NoTransactionsFound("combined statement".into()).kind(),
            "no_transactions_found"
        );
        assert_ne!(
            Error::UnsupportedFormat.to_string(),
            Error::NoTransactionsFound(String::new()).to_string()
        );
    }
}
