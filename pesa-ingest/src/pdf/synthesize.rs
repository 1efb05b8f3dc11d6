//! Expand summary lines into synthetic transactions.
//!
//! Each line yields an income leg when `paid_in > 0` and an expense leg when
//! `paid_out > 0`. Legs are dated to a pseudo-random day (1-28) of the
//! statement month; the generator is seeded from the statement month so the
//! same input always produces the same dates.

use chrono::{Datelike, NaiveDate, NaiveTime};
use pesa_core::normalize::end_of_day;
use pesa_core::{Format, Source, StatementTotals, Transaction, TxType, SUMMARY_MARKER};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::category_rules::label_category;
use crate::types::SummaryLine;

/// Synthetic records carry no per-transaction evidence.
pub const SYNTHETIC_CONFIDENCE: f64 = 0.7;

/// Which side of a summary line a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Income,
    Expense,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Synthesized {
    pub transaction: Transaction,
    pub leg: Leg,
}

/// Expense type from the summary label.
pub fn expense_type(label: &str) -> TxType {
    let lower = label.to_lowercase();
    if lower.contains("pay") {
        TxType::Payment
    } else if lower.contains("withdraw") {
        TxType::Withdrawal
    } else {
        TxType::Sent
    }
}

fn month_seed(statement_date: NaiveDate) -> u64 {
    statement_date.year() as u64 * 100 + u64::from(statement_date.month())
}

/// Produce income and expense legs, in line order (income before expense).
pub fn synthesize(
    lines: &[SummaryLine],
    statement_date: NaiveDate,
    statement_ref: &str,
) -> Vec<Synthesized> {
    let mut rng = StdRng::seed_from_u64(month_seed(statement_date));
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let day_in_month = |rng: &mut StdRng| {
        let day = rng.gen_range(1..=28);
        NaiveDate::from_ymd_opt(statement_date.year(), statement_date.month(), day)
            .unwrap_or(statement_date)
            .and_time(noon)
    };

    let mut out = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let label = line.transaction_type.trim();
        let category = label_category(label);
        let n = i + 1;

        if line.paid_in > 0.0 {
            let txn = Transaction::new(
                format!("{statement_ref}-{n:03}-IN"),
                day_in_month(&mut rng),
                TxType::Received,
                line.paid_in,
                Source::Pdf,
                Format::PdfSummary,
            )
            .with_description(format!("{label} (Received)"))
            .with_category(category)
            .with_confidence(SYNTHETIC_CONFIDENCE)
            .with_statement_ref(Some(statement_ref.to_string()));
            out.push(Synthesized { transaction: txn, leg: Leg::Income });
        }

        if line.paid_out > 0.0 {
            let txn = Transaction::new(
                format!("{statement_ref}-{n:03}-OUT"),
                day_in_month(&mut rng),
                expense_type(label),
                line.paid_out,
                Source::Pdf,
                Format::PdfSummary,
            )
            .with_description(format!("{label} (Paid Out)"))
            .with_category(category)
            .with_confidence(SYNTHETIC_CONFIDENCE)
            .with_statement_ref(Some(statement_ref.to_string()));
            out.push(Synthesized { transaction: txn, leg: Leg::Expense });
        }
    }
    out
}

/// Audit record for the whole statement: RECEIVED for total paid-in,
/// carrying the totals. Aggregates must skip it (`is_summary_anchor`).
pub fn summary_anchor(
    totals: StatementTotals,
    statement_date: NaiveDate,
    statement_ref: &str,
) -> Synthesized {
    let mut txn = Transaction::new(
        format!("{statement_ref}-SUMMARY"),
        end_of_day(statement_date),
        TxType::Received,
        totals.total_income,
        Source::Pdf,
        Format::PdfSummary,
    )
    .with_description(format!(
        "{SUMMARY_MARKER} {statement_ref}: income {:.2}, expenses {:.2}, net {:.2}",
        totals.total_income, totals.total_expenses, totals.net_amount
    ))
    .with_confidence(SYNTHETIC_CONFIDENCE)
    .with_statement_ref(Some(statement_ref.to_string()));
    txn.summary = Some(totals);
    Synthesized { transaction: txn, leg: Leg::Summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_core::Category;

    fn june() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_expense_type_keywords() {
        assert_eq!(expense_type("Pay Bill Online"), TxType::Payment);
        assert_eq!(expense_type("Buy Goods Payment"), TxType::Payment);
        assert_eq!(expense_type("Agent Withdrawal"), TxType::Withdrawal);
        assert_eq!(expense_type("Customer Transfer"), TxType::Sent);
    }

    #[test]
    fn test_legs_per_line() {
        let lines = vec![
            SummaryLine::new("Customer Transfer", 0.0, 500.0),
            SummaryLine::new("Customer Receive", 1000.0, 0.0),
            SummaryLine::new("Reversal", 20.0, 20.0),
            SummaryLine::new("Nothing", 0.0, 0.0),
        ];
        let out = synthesize(&lines, june(), "STMT1");
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].transaction.transaction_id, "STMT1-001-OUT");
        assert_eq!(out[0].leg, Leg::Expense);
        assert_eq!(out[1].transaction.tx_type, TxType::Received);
        assert_eq!(out[1].transaction.description, "Customer Receive (Received)");
        assert_eq!(out[1].transaction.category, Category::Income);
        assert_eq!(out[2].leg, Leg::Income);
        assert_eq!(out[3].leg, Leg::Expense);
    }

    #[test]
    fn test_dates_within_statement_month_and_deterministic() {
        let lines: Vec<_> = (0..20)
            .map(|i| SummaryLine::new(format!("Line {i}"), 10.0, 5.0))
            .collect();
        let a = synthesize(&lines, june(), "S");
        let b = synthesize(&lines, june(), "S");
        assert_eq!(a, b);
        for s in &a {
            let d = s.transaction.date.date();
            assert_eq!((d.year(), d.month()), (2024, 6));
            assert!((1..=28).contains(&d.day()));
        }
    }

    #[test]
    fn test_summary_anchor() {
        let totals = StatementTotals {
            total_income: 1000.0,
            total_expenses: 400.0,
            net_amount: 600.0,
            transaction_count: 3,
        };
        let anchor = summary_anchor(totals, june(), "S");
        assert!(anchor.transaction.is_summary_anchor());
        assert!(anchor.transaction.description.starts_with(SUMMARY_MARKER));
        assert_eq!(anchor.transaction.amount, 1000.0);
        assert_eq!(anchor.transaction.tx_type, TxType::Received);
    }
}
