//! Question entities → store filter.

use pesa_core::TransactionFilter;

use crate::intent::QueryEntities;

/// Compose a store filter from extracted entities, scoped to one user.
pub fn build_transaction_filter(user_id: &str, entities: &QueryEntities) -> TransactionFilter {
    TransactionFilter::build(
        user_id,
        Some(entities.timeframe.start),
        Some(entities.timeframe.end),
        Some(&entities.categories),
        entities.amount_thresholds.min,
        entities.amount_thresholds.max,
    )
}
