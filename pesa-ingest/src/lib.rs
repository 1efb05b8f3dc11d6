//! pesa-ingest: M-Pesa SMS and PDF statement ingestion.

pub mod category_rules;
pub mod pdf;
pub mod sms;
pub mod types;

pub use category_rules::{label_category, statement_category, RuleCategorizer};
pub use pdf::{parse_pdf, try_parse_pdf, PdfOptions, PdfOutcome, PdfParse, PdfStats};
pub use sms::{
    parse_sms, parse_sms_at, parse_sms_batch, parse_sms_batch_at, try_parse_sms, try_parse_sms_at,
    BatchOutcome, ParseOutcome, SmsParse,
};
pub use types::{CombinedStatementBlock, ParseFailure, PdfInput, SummaryLine, SummarySource};
