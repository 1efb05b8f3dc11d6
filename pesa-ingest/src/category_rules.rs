//! Deterministic category rules for statement descriptions and summary labels.
//!
//! Combined-statement descriptions and PDF summary labels use a short fixed
//! vocabulary, so keyword rules cover them without a model call.

use async_trait::async_trait;
use pesa_core::{categorize, Categorizer, Category, Result, Transaction};

/// Ordered (keywords, category) rules for M-Pesa statement vocabulary.
const STATEMENT_RULES: &[(&[&str], Category)] = &[
    (&["bundle", "airtime", "safaricom"], Category::Utilities),
    (&["transfer"], Category::Transfer),
    (&["pay bill", "paybill"], Category::Bills),
    (&["buy goods"], Category::Shopping),
];

const INCOME_WORDS: &[&str] = &["receive", "deposit", "salary", "reversal"];

fn rule_match(text: &str) -> Option<Category> {
    let lower = text.to_lowercase();
    STATEMENT_RULES
        .iter()
        .find(|(kws, _)| kws.iter().any(|k| lower.contains(k)))
        .map(|(_, c)| *c)
}

/// Category for a combined-statement sub-record description.
pub fn statement_category(description: &str) -> Category {
    rule_match(description).unwrap_or(Category::Other)
}

/// Category for a PDF summary "transaction type" label.
///
/// Priority: statement rules > income words > taxonomy keywords.
pub fn label_category(label: &str) -> Category {
    if let Some(c) = rule_match(label) {
        return c;
    }
    let lower = label.to_lowercase();
    if INCOME_WORDS.iter().any(|w| lower.contains(w)) {
        return Category::Income;
    }
    categorize(label)
}

/// Offline categorizer: fills `Other` categories from description and counterparty.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleCategorizer;

#[async_trait]
impl Categorizer for RuleCategorizer {
    async fn categorize(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        Ok(txns
            .into_iter()
            .map(|mut t| {
                if t.category == Category::Other && !t.is_summary_anchor() {
                    let text = format!("{} {}", t.description, t.counterparty);
                    t.category = rule_match(&text).unwrap_or_else(|| categorize(&text));
                }
                t
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pesa_core::{Format, Source, TxType};

    #[test]
    fn test_bundle_purchase_is_utilities() {
        assert_eq!(statement_category("Bundle Purchase"), Category::Utilities);
        assert_eq!(statement_category("Airtime Purchase"), Category::Utilities);
    }

    #[test]
    fn test_transfer_before_pay_bill() {
        assert_eq!(statement_category("Customer Transfer"), Category::Transfer);
        assert_eq!(statement_category("Pay Bill Online"), Category::Bills);
        assert_eq!(statement_category("Buy Goods Online"), Category::Shopping);
    }

    #[test]
    fn test_unknown_description_is_other() {
        assert_eq!(statement_category("Merchant Payment"), Category::Other);
    }

    #[test]
    fn test_label_category_income_and_taxonomy() {
        assert_eq!(label_category("Customer Receive"), Category::Income);
        assert_eq!(label_category("Deposit of Funds at Agent"), Category::Income);
        assert_eq!(label_category("KPLC Tokens"), Category::Utilities);
        assert_eq!(label_category("Agent Withdrawal"), Category::Other);
    }

    #[tokio::test]
    async fn test_rule_categorizer_fills_other_only() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let naivas = Transaction::new("a", at, TxType::Payment, 300.0, Source::Sms, Format::BusinessPayment)
            .with_description("Paid to NAIVAS SUPERMARKET")
            .with_counterparty("NAIVAS SUPERMARKET");
        let fixed = Transaction::new("b", at, TxType::Sent, 10.0, Source::Sms, Format::Sent)
            .with_description("Sent to JOHN")
            .with_category(Category::Health);

        let out = RuleCategorizer.categorize(vec![naivas, fixed]).await.unwrap();
        assert_eq!(out[0].category, Category::Food);
        assert_eq!(out[1].category, Category::Health);
    }
}
