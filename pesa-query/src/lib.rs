//! pesa-query: classify financial questions and turn them into store filters.

pub mod entities;
pub mod filter;
pub mod intent;
pub mod lexicon;
pub mod timeframe;

pub use entities::{extract_amount_thresholds, extract_categories};
pub use filter::build_transaction_filter;
pub use intent::{
    extract_query_intent, extract_query_intent_at, extract_query_intent_with, Intent,
    QueryEntities, QueryIntent, QueryOptions,
};
pub use timeframe::{resolve_timeframe, resolve_timeframe_with, DEFAULT_WINDOW_DAYS};
