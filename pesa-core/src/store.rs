//! Contracts for the collaborators around the parsing core: a transaction
//! store and an external categorization service.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::filter::TransactionFilter;
use crate::finance::{Category, Transaction};
use crate::statement::Statement;

/// A transaction as persisted, with its store-assigned id and owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTransaction {
    pub id: u64,
    pub user_id: String,
    #[serde(flatten)]
    pub transaction: Transaction,
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert_transactions(
        &self,
        user_id: &str,
        txns: Vec<Transaction>,
    ) -> Result<Vec<StoredTransaction>>;

    async fn find_transactions(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>>;

    async fn update_transaction_category(&self, id: u64, category: Category) -> Result<()>;

    /// Returns the number of rows removed.
    async fn delete_transactions_by_statement(&self, statement_id: &str) -> Result<usize>;

    async fn insert_statement(&self, statement: Statement) -> Result<()>;
}

/// External categorization service (typically an LLM).
#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>>;
}

/// Run a categorizer without ever losing extracted data.
///
/// Only the `category` field is taken from the service, matched by
/// transaction id. On failure every transaction keeps its current category.
pub async fn categorize_or_keep(categorizer: &dyn Categorizer, txns: Vec<Transaction>) -> Vec<Transaction> {
    let categorized = match categorizer.categorize(txns.clone()).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, count = txns.len(), "categorization failed; keeping existing categories");
            return txns;
        }
    };

    let by_id: HashMap<&str, Category> = categorized
        .iter()
        .map(|t| (t.transaction_id.as_str(), t.category))
        .collect();

    txns.into_iter()
        .map(|mut t| {
            if let Some(c) = by_id.get(t.transaction_id.as_str()) {
                t.category = *c;
            }
            t
        })
        .collect()
}

#[derive(Debug, Default)]
struct MemoryInner {
    next_id: u64,
    rows: Vec<StoredTransaction>,
    statements: Vec<Statement>,
}

/// In-process store, used by tests and as a reference implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statements(&self) -> Result<Vec<Statement>> {
        Ok(self.lock()?.statements.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| Error::ExternalService("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn insert_transactions(
        &self,
        user_id: &str,
        txns: Vec<Transaction>,
    ) -> Result<Vec<StoredTransaction>> {
        let mut inner = self.lock()?;
        let mut out = Vec::with_capacity(txns.len());
        for transaction in txns {
            inner.next_id += 1;
            let row = StoredTransaction {
                id: inner.next_id,
                user_id: user_id.to_string(),
                transaction,
            };
            inner.rows.push(row.clone());
            out.push(row);
        }
        Ok(out)
    }

    async fn find_transactions(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>> {
        let inner = self.lock()?;
        Ok(inner
            .rows
            .iter()
            .filter(|r| r.user_id == filter.user_id && filter.matches(&r.transaction))
            .cloned()
            .collect())
    }

    async fn update_transaction_category(&self, id: u64, category: Category) -> Result<()> {
        let mut inner = self.lock()?;
        let row = inner
            .rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::ExternalService(format!("transaction {id} not found")))?;
        row.transaction.category = category;
        Ok(())
    }

    async fn delete_transactions_by_statement(&self, statement_id: &str) -> Result<usize> {
        let mut inner = self.lock()?;
        let before = inner.rows.len();
        inner
            .rows
            .retain(|r| r.transaction.statement_ref.as_deref() != Some(statement_id));
        inner.statements.retain(|s| s.statement_id != statement_id);
        Ok(before - inner.rows.len())
    }

    async fn insert_statement(&self, statement: Statement) -> Result<()> {
        self.lock()?.statements.push(statement);
        Ok(())
    }
}
