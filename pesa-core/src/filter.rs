//! Storage-agnostic transaction filter descriptor.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::finance::{Category, Transaction};

/// Inclusive, day-bounded range: start at 00:00:00, end at 23:59:59.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Amount bounds pulled from a question; either side may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct AmountThresholds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AmountThresholds {
    pub fn min(min: f64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn max(max: f64) -> Self {
        Self { min: None, max: Some(max) }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self { min: Some(min), max: Some(max) }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, amount: f64) -> bool {
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}

/// Query descriptor consumed by a transaction store.
///
/// Each clause is present only when it constrains something.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionFilter {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<BTreeSet<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<AmountThresholds>,
}

impl TransactionFilter {
    /// Compose the descriptor from optional parts.
    pub fn build(
        user_id: impl Into<String>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        categories: Option<&BTreeSet<Category>>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        let date = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };
        let categories = categories.filter(|c| !c.is_empty()).cloned();
        let amount = AmountThresholds { min, max };
        Self {
            user_id: user_id.into(),
            date,
            categories,
            amount: (!amount.is_empty()).then_some(amount),
        }
    }

    /// Evaluate the descriptor in-process. Summary anchors never match.
    pub fn matches(&self, txn: &Transaction) -> bool {
        if txn.is_summary_anchor() {
            return false;
        }
        if let Some(range) = &self.date {
            if !range.contains(txn.date) {
                return false;
            }
        }
        if let Some(cats) = &self.categories {
            if !cats.contains(&txn.category) {
                return false;
            }
        }
        if let Some(amount) = &self.amount {
            if !amount.contains(txn.amount) {
                return false;
            }
        }
        true
    }
}
