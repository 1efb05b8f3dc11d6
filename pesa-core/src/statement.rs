//! Statement aggregation: totals over a batch of parsed transactions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::finance::{Source, Transaction};

/// Aggregate figures for one batch of transactions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct StatementTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_amount: f64,
    pub transaction_count: usize,
}

impl StatementTotals {
    /// Sum income and expense legs.
    ///
    /// The synthetic summary record is skipped so its income is not counted twice.
    /// `Other`-typed records count toward `transaction_count` only.
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let mut totals = StatementTotals::default();
        for t in txns.iter().filter(|t| !t.is_summary_anchor()) {
            if t.tx_type.is_income() {
                totals.total_income += t.amount;
            } else if t.tx_type.is_expense() {
                totals.total_expenses += t.amount;
            }
            totals.transaction_count += 1;
        }
        totals.net_amount = totals.total_income - totals.total_expenses;
        totals
    }
}

/// Envelope persisted alongside a batch of transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub statement_id: String,
    pub user_id: String,
    pub source: Source,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub totals: StatementTotals,
    pub created_at: NaiveDateTime,
}

impl Statement {
    /// Build the envelope; the period spans the earliest to latest transaction date.
    pub fn from_transactions(
        statement_id: impl Into<String>,
        user_id: impl Into<String>,
        source: Source,
        txns: &[Transaction],
        created_at: NaiveDateTime,
    ) -> Self {
        let dates = txns
            .iter()
            .filter(|t| !t.is_summary_anchor())
            .map(|t| t.date.date());
        let period_start = dates.clone().min();
        let period_end = dates.max();
        Self {
            statement_id: statement_id.into(),
            user_id: user_id.into(),
            source,
            period_start,
            period_end,
            totals: StatementTotals::from_transactions(txns),
            created_at,
        }
    }
}
