//! Category and amount-threshold extraction from a question.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use pesa_core::normalize::parse_amount;
use pesa_core::{matching_categories, AmountThresholds, Category};
use regex::{Captures, Regex};

static EATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:eat|eats|ate|eating|dine|dined|dining)\b").expect("valid eating regex"));
static TRAVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:drove|drive|driving|ride|rides|riding)\b").expect("valid travel regex"));

/// Categories named in the question, plus the verb-based implications.
pub fn extract_categories(question: &str) -> BTreeSet<Category> {
    let mut out: BTreeSet<Category> = matching_categories(question).into_iter().collect();
    if EATING.is_match(question) {
        out.insert(Category::Food);
    }
    if TRAVEL.is_match(question) {
        out.insert(Category::Transport);
    }
    out
}

/// Optional currency prefix, then the number.
const AMT: &str = r"(?:(?:ksh|kes)\.?\s*)?(\d[\d,]*(?:\.\d+)?)";
/// Optional currency suffix.
const UNIT: &str = r"(?:\s*(?:ksh|kes|shillings|bob))?";

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
    Range,
}

static AMOUNT_RULES: Lazy<Vec<(Regex, Bound)>> = Lazy::new(|| {
    let rule = |pattern: String, bound| {
        (
            Regex::new(&format!("(?i){pattern}")).expect("valid amount regex"),
            bound,
        )
    };
    vec![
        rule(format!(r"\bbetween\s+{AMT}{UNIT}\s+(?:and|to)\s+{AMT}"), Bound::Range),
        rule(
            format!(r"\b(?:no\s+more\s+than|not\s+more\s+than|at\s+most|up\s+to|maximum(?:\s+of)?)\s+{AMT}"),
            Bound::Max,
        ),
        rule(
            format!(r"\b(?:no\s+less\s+than|not\s+less\s+than|at\s+least|minimum(?:\s+of)?)\s+{AMT}"),
            Bound::Min,
        ),
        rule(
            format!(r"\b(?:more\s+than|over|above|greater\s+than|exceeding|bigger\s+than)\s+{AMT}"),
            Bound::Min,
        ),
        rule(
            format!(r"\b(?:less\s+than|under|below|lower\s+than|cheaper\s+than)\s+{AMT}"),
            Bound::Max,
        ),
        rule(format!(r"\b{AMT}\s*\+"), Bound::Min),
        rule(format!(r"\b{AMT}{UNIT}\s+(?:and\s+(?:above|over|more)|or\s+more)\b"), Bound::Min),
        rule(format!(r"\b{AMT}{UNIT}\s+(?:or\s+less|and\s+(?:below|under|less))\b"), Bound::Max),
    ]
});

fn number(caps: &Captures<'_>, idx: usize) -> Option<f64> {
    caps.get(idx).and_then(|m| parse_amount(m.as_str()))
}

/// First matching amount phrase decides the bounds; none gives empty thresholds.
pub fn extract_amount_thresholds(question: &str) -> AmountThresholds {
    for (re, bound) in AMOUNT_RULES.iter() {
        let Some(caps) = re.captures(question) else {
            continue;
        };
        let parsed = match bound {
            Bound::Min => number(&caps, 1).map(AmountThresholds::min),
            Bound::Max => number(&caps, 1).map(AmountThresholds::max),
            Bound::Range => match (number(&caps, 1), number(&caps, 2)) {
                (Some(a), Some(b)) => Some(AmountThresholds::range(a.min(b), a.max(b))),
                _ => None,
            },
        };
        if let Some(thresholds) = parsed {
            return thresholds;
        }
    }
    AmountThresholds::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cats(q: &str) -> Vec<Category> {
        extract_categories(q).into_iter().collect()
    }

    #[test]
    fn test_named_and_keyword_categories() {
        assert_eq!(cats("How much on food?"), vec![Category::Food]);
        assert_eq!(cats("uber and lunch"), vec![Category::Food, Category::Transport]);
        assert!(cats("how is it going").is_empty());
    }

    #[test]
    fn test_semantic_rules() {
        assert_eq!(cats("where did I eat out"), vec![Category::Food]);
        assert_eq!(cats("dining and driving costs"), vec![Category::Food, Category::Transport]);
        // already present: no duplicate
        assert_eq!(cats("restaurant dining"), vec![Category::Food]);
    }

    #[test]
    fn test_between() {
        let t = extract_amount_thresholds("payments between 100 and 500");
        assert_eq!((t.min, t.max), (Some(100.0), Some(500.0)));
        let t = extract_amount_thresholds("between Ksh 2,000 to KES 1,500");
        assert_eq!((t.min, t.max), (Some(1500.0), Some(2000.0)));
    }

    #[test]
    fn test_min_phrases() {
        assert_eq!(extract_amount_thresholds("over 1,000").min, Some(1000.0));
        assert_eq!(extract_amount_thresholds("more than ksh500").min, Some(500.0));
        assert_eq!(extract_amount_thresholds("at least 250.50").min, Some(250.5));
        assert_eq!(extract_amount_thresholds("5000+ purchases").min, Some(5000.0));
        assert_eq!(extract_amount_thresholds("2,500 and above").min, Some(2500.0));
        assert_eq!(extract_amount_thresholds("300 shillings or more").min, Some(300.0));
    }

    #[test]
    fn test_max_phrases() {
        let t = extract_amount_thresholds("no more than 200");
        assert_eq!((t.min, t.max), (None, Some(200.0)));
        assert_eq!(extract_amount_thresholds("under KES 50").max, Some(50.0));
        assert_eq!(extract_amount_thresholds("100 or less").max, Some(100.0));
        assert_eq!(extract_amount_thresholds("no less than 80").min, Some(80.0));
    }

    #[test]
    fn test_no_amount_means_empty() {
        let t = extract_amount_thresholds("how much did I spend last month");
        assert!(t.is_empty());
    }
}
