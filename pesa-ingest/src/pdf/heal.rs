//! Type self-healing for synthesized transactions.
//!
//! Runs as its own pass after synthesis. Any record whose type is not one of
//! the five concrete types gets a type re-derived from its description, or
//! failing that from the leg it was built for.

use pesa_core::{Error, Result, TxType};
use tracing::info;

use super::synthesize::{Leg, Synthesized};

fn derive_type(description: &str, leg: Leg) -> TxType {
    let lower = description.to_lowercase();
    if lower.contains("received") {
        TxType::Received
    } else if lower.contains("sent") {
        TxType::Sent
    } else {
        match leg {
            Leg::Income | Leg::Summary => TxType::Received,
            Leg::Expense => TxType::Sent,
        }
    }
}

/// Repair invalid types in place; returns how many records changed.
pub fn heal_types(items: &mut [Synthesized]) -> usize {
    let mut healed = 0;
    for item in items.iter_mut().filter(|i| !i.transaction.tx_type.is_valid()) {
        let fixed = derive_type(&item.transaction.description, item.leg);
        info!(
            id = %item.transaction.transaction_id,
            from = ?item.transaction.tx_type,
            to = ?fixed,
            "healed transaction type"
        );
        item.transaction.tx_type = fixed;
        healed += 1;
    }
    healed
}

/// Strict mode: reject instead of repairing.
pub fn ensure_valid_types(items: &[Synthesized]) -> Result<()> {
    match items.iter().find(|i| !i.transaction.tx_type.is_valid()) {
        Some(bad) => Err(Error::InvalidTransactionType {
            id: bad.transaction.transaction_id.clone(),
            label: format!("{:?}", bad.transaction.tx_type).to_uppercase(),
        }),
        None => Ok(()),
    }
}
