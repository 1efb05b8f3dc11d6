//! PDF summary table extraction.
//!
//! Expected text after PDF-to-text:
//!   TRANSACTION TYPE          PAID IN      PAID OUT
//!   Customer Transfer         0.00         12,500.00
//!   Customer Receive          18,000.00    0.00
//!   TOTAL:                    18,000.00    12,500.00

use std::io::Read;

use pesa_core::normalize::parse_amount;
use pesa_core::{Error, Result};
use tracing::{debug, warn};

use crate::types::{PdfInput, SummaryLine, SummarySource};

const HEADER_MARKERS: [&str; 3] = ["TRANSACTION TYPE", "PAID IN", "PAID OUT"];

fn is_header(line: &str) -> bool {
    let upper = line.to_uppercase();
    HEADER_MARKERS.iter().all(|m| upper.contains(m))
}

fn is_total(line: &str) -> bool {
    line.trim_start().to_uppercase().starts_with("TOTAL:")
}

fn column_amount(token: &str, column: &str, label: &str) -> f64 {
    if token == "-" {
        return 0.0;
    }
    parse_amount(token).unwrap_or_else(|| {
        warn!(column, label, raw = token, "malformed numeric column; using 0");
        0.0
    })
}

/// A column cell: `-`, or a token carrying digits. Words never are.
fn is_amount_cell(token: &str) -> bool {
    token == "-" || token.bytes().any(|b| b.is_ascii_digit())
}

/// Split one table row: trailing tokens are paid-in then paid-out.
fn parse_row(line: &str) -> Option<SummaryLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        debug!(line, "row has too few columns; skipped");
        return None;
    }
    let (label, amounts) = tokens.split_at(tokens.len() - 2);
    let readable = amounts.iter().any(|t| *t == "-" || parse_amount(t).is_some());
    if !readable || !amounts.iter().all(|t| is_amount_cell(t)) {
        debug!(line, "trailing columns are not amounts; skipped");
        return None;
    }
    let label = label.join(" ");
    let paid_out = column_amount(amounts[1], "paid_out", &label);
    let paid_in = column_amount(amounts[0], "paid_in", &label);
    Some(SummaryLine::new(label, paid_in, paid_out))
}

/// Parse the summary table out of extracted statement text.
pub fn parse_summary_text(text: &str) -> Result<Vec<SummaryLine>> {
    let mut lines = text.lines();
    if !lines.by_ref().any(is_header) {
        return Err(Error::MissingSummaryHeader);
    }

    let rows = lines
        .take_while(|l| !is_total(l))
        .filter(|l| !l.trim().is_empty())
        .filter_map(parse_row)
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), "parsed summary table");
    Ok(rows)
}

/// Read pre-structured rows from CSV: `transaction type, paid in, paid out`.
///
/// A header row is skipped when its first cell is not followed by numbers.
pub fn parse_summary_csv<R: Read>(reader: R) -> Result<Vec<SummaryLine>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let label = record.get(0).unwrap_or("");
        if label.is_empty() || is_total(label) {
            continue;
        }
        let paid_in_raw = record.get(1).unwrap_or("");
        let paid_out_raw = record.get(2).unwrap_or("");
        if i == 0 && parse_amount(paid_in_raw).is_none() && parse_amount(paid_out_raw).is_none() {
            continue;
        }
        out.push(SummaryLine::new(
            label,
            column_amount(paid_in_raw, "paid_in", label),
            column_amount(paid_out_raw, "paid_out", label),
        ));
    }
    Ok(out)
}

/// Demo table used when no statement is supplied. Flagged as `SummarySource::Sample`.
pub fn sample_summary() -> Vec<SummaryLine> {
    vec![
        SummaryLine::new("Customer Transfer", 0.0, 12_500.0),
        SummaryLine::new("Customer Receive", 18_000.0, 0.0),
        SummaryLine::new("Pay Bill Online", 0.0, 4_300.0),
        SummaryLine::new("Buy Goods Payment", 0.0, 6_750.0),
        SummaryLine::new("Agent Withdrawal", 0.0, 3_000.0),
        SummaryLine::new("Airtime Purchase", 0.0, 800.0),
        SummaryLine::new("Deposit of Funds at Agent", 5_000.0, 0.0),
    ]
}

/// Resolve any PDF input to summary lines plus where they came from.
pub fn extract_summary(input: &PdfInput) -> Result<(Vec<SummaryLine>, SummarySource)> {
    match input {
        PdfInput::Rows(rows) => Ok((rows.clone(), SummarySource::Rows)),
        PdfInput::Text(text) => Ok((parse_summary_text(text)?, SummarySource::Text)),
        PdfInput::Absent => {
            warn!("no statement supplied; using sample summary table");
            Ok((sample_summary(), SummarySource::Sample))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
M-PESA STATEMENT
Customer Name: JANE DOE
SUMMARY
TRANSACTION TYPE          PAID IN      PAID OUT
Customer Transfer         0.00         12,500.00

Customer Receive          18,000.00    0.00
Pay Bill Online           -            4,300.00
TOTAL:                    18,000.00    16,800.00
Customer Transfer         999.00       999.00
"#;

    #[test]
    fn test_parse_summary_text() {
        let rows = parse_summary_text(TABLE).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], SummaryLine::new("Customer Transfer", 0.0, 12_500.0));
        assert_eq!(rows[1].paid_in, 18_000.0);
        assert_eq!(rows[2].transaction_type, "Pay Bill Online");
        assert_eq!(rows[2].paid_in, 0.0);
        assert_eq!(rows[2].paid_out, 4_300.0);
    }

    #[test]
    fn test_paid_out_is_last_column() {
        let rows = parse_summary_text("TRANSACTION TYPE PAID IN PAID OUT\nX Y 1.00 2.00\n").unwrap();
        assert_eq!(rows[0].transaction_type, "X Y");
        assert_eq!(rows[0].paid_in, 1.0);
        assert_eq!(rows[0].paid_out, 2.0);
    }

    #[test]
    fn test_malformed_numeric_defaults_to_zero() {
        let rows = parse_summary_text("TRANSACTION TYPE PAID IN PAID OUT\nCustomer Transfer 1O0.00 50.00\n").unwrap();
        assert_eq!(rows[0].paid_in, 0.0);
        assert_eq!(rows[0].paid_out, 50.0);
    }

    #[test]
    fn test_prose_between_header_and_total_is_skipped() {
        let text = "TRANSACTION TYPE PAID IN PAID OUT\nCustomer Transfer 0.00 500.00\nStatement Period 01 Jun 2024\nPrinted 01/06/2024 10:30\nTOTAL: 0.00 500.00\n";
        let rows = parse_summary_text(text).unwrap();
        assert_eq!(rows, vec![SummaryLine::new("Customer Transfer", 0.0, 500.0)]);
    }

    #[test]
    fn test_missing_header() {
        let err = parse_summary_text("Customer Transfer 0.00 10.00").unwrap_err();
        assert_eq!(err.kind(), "missing_summary_header");
    }

    #[test]
    fn test_parse_summary_csv_with_header() {
        let csv = "Transaction Type,Paid In,Paid Out\nCustomer Transfer,0.00,\"1,200.00\"\nCustomer Receive,500,0\nTOTAL:,500,1200\n";
        let rows = parse_summary_csv(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].paid_out, 1200.0);
        assert_eq!(rows[1].paid_in, 500.0);
    }

    #[test]
    fn test_absent_input_uses_sample() {
        let (rows, source) = extract_summary(&PdfInput::Absent).unwrap();
        assert_eq!(source, SummarySource::Sample);
        assert!(!rows.is_empty());
    }
}
