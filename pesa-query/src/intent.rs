//! Question → intent plus extracted entities.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDateTime};
use pesa_core::{AmountThresholds, Category, DateRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::{extract_amount_thresholds, extract_categories};
use crate::lexicon;
use crate::timeframe::{resolve_timeframe_with, DEFAULT_WINDOW_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Balance,
    Spending,
    Income,
    Category,
    Trend,
    Advice,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    pub timeframe: DateRange,
    pub categories: BTreeSet<Category>,
    pub amount_thresholds: AmountThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub is_financial_query: bool,
    pub primary_intent: Intent,
    pub entities: QueryEntities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Trailing window used when the question names no period
    pub default_window_days: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            default_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

pub fn extract_query_intent_with(
    question: &str,
    now: NaiveDateTime,
    opts: &QueryOptions,
) -> QueryIntent {
    let lower = question.to_lowercase();
    let intent = QueryIntent {
        is_financial_query: lexicon::is_financial(&lower),
        primary_intent: lexicon::primary_intent(&lower),
        entities: QueryEntities {
            timeframe: resolve_timeframe_with(&lower, now, opts.default_window_days),
            categories: extract_categories(&lower),
            amount_thresholds: extract_amount_thresholds(&lower),
        },
    };
    debug!(
        financial = intent.is_financial_query,
        intent = ?intent.primary_intent,
        categories = intent.entities.categories.len(),
        "classified question"
    );
    intent
}

pub fn extract_query_intent_at(question: &str, now: NaiveDateTime) -> QueryIntent {
    extract_query_intent_with(question, now, &QueryOptions::default())
}

/// Classify against the local clock.
pub fn extract_query_intent(question: &str) -> QueryIntent {
    extract_query_intent_at(question, Local::now().naive_local())
}
