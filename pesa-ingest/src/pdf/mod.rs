//! PDF statement ingestion: summary table → synthetic transactions.

pub mod heal;
pub mod summary;
pub mod synthesize;

use chrono::NaiveDate;
use pesa_core::{Error, Result, StatementTotals, Transaction};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{ParseFailure, PdfInput, SummarySource};

pub use summary::{extract_summary, parse_summary_csv, parse_summary_text, sample_summary};
pub use synthesize::{Leg, Synthesized, SYNTHETIC_CONFIDENCE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    /// Defaults to `PDF{YYYYMMDD}` of the statement date
    pub statement_ref: Option<String>,
    /// Repair invalid types; when off, an invalid type fails the parse
    pub self_heal: bool,
    /// Append the statement-level summary record
    pub summary_anchor: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            statement_ref: None,
            self_heal: true,
            summary_anchor: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfStats {
    pub lines: usize,
    pub income_transactions: usize,
    pub expense_transactions: usize,
    pub healed: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_amount: f64,
    /// Set when the built-in sample table stood in for a real statement
    pub sample_data: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfParse {
    pub statement_ref: String,
    pub source: SummarySource,
    pub transactions: Vec<Transaction>,
    pub stats: PdfStats,
}

/// Total result of `parse_pdf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_ref: Option<String>,
    pub transactions: Vec<Transaction>,
    pub stats: PdfStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ParseFailure>,
}

pub fn default_statement_ref(statement_date: NaiveDate) -> String {
    format!("PDF{}", statement_date.format("%Y%m%d"))
}

pub fn try_parse_pdf(
    input: &PdfInput,
    statement_date: NaiveDate,
    opts: &PdfOptions,
) -> Result<PdfParse> {
    let (lines, source) = extract_summary(input)?;
    let statement_ref = opts
        .statement_ref
        .clone()
        .unwrap_or_else(|| default_statement_ref(statement_date));
    debug!(lines = lines.len(), ?source, %statement_ref, "extracted summary");

    let mut legs = synthesize::synthesize(&lines, statement_date, &statement_ref);
    if legs.is_empty() {
        return Err(Error::NoTransactionsFound(format!(
            "summary for {statement_ref} has no non-zero rows"
        )));
    }

    let healed = if opts.self_heal {
        heal::heal_types(&mut legs)
    } else {
        heal::ensure_valid_types(&legs)?;
        0
    };

    let income_transactions = legs.iter().filter(|s| s.leg == Leg::Income).count();
    let expense_transactions = legs.iter().filter(|s| s.leg == Leg::Expense).count();
    let mut transactions: Vec<Transaction> = legs.into_iter().map(|s| s.transaction).collect();
    let totals = StatementTotals::from_transactions(&transactions);

    if opts.summary_anchor {
        let anchor = synthesize::summary_anchor(totals, statement_date, &statement_ref);
        transactions.push(anchor.transaction);
    }

    let stats = PdfStats {
        lines: lines.len(),
        income_transactions,
        expense_transactions,
        healed,
        total_income: totals.total_income,
        total_expenses: totals.total_expenses,
        net_amount: totals.net_amount,
        sample_data: source == SummarySource::Sample,
    };
    info!(
        %statement_ref,
        transactions = transactions.len(),
        healed,
        sample = stats.sample_data,
        "synthesized pdf statement"
    );

    Ok(PdfParse {
        statement_ref,
        source,
        transactions,
        stats,
    })
}

/// Parse a statement; never returns `Err`.
pub fn parse_pdf(input: &PdfInput, statement_date: NaiveDate, opts: &PdfOptions) -> PdfOutcome {
    match try_parse_pdf(input, statement_date, opts) {
        Ok(p) => PdfOutcome {
            ok: true,
            statement_ref: Some(p.statement_ref),
            transactions: p.transactions,
            stats: p.stats,
            error: None,
        },
        Err(e) => PdfOutcome {
            ok: false,
            statement_ref: None,
            transactions: Vec::new(),
            stats: PdfStats::default(),
            error: Some(ParseFailure::from(&e)),
        },
    }
}
