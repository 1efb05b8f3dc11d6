//! Transaction store backed by one JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pesa_core::{
    Category, Error, Result, Statement, StoredTransaction, Transaction, TransactionFilter,
    TransactionStore,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    next_id: u64,
    transactions: Vec<StoredTransaction>,
    statements: Vec<Statement>,
}

/// Whole-file read/modify/write per call; the mutex only serializes writers
/// within this process.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreFile> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) if s.trim().is_empty() => Ok(StoreFile::default()),
            Ok(s) => Ok(serde_json::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &StoreFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), rows = file.transactions.len(), "saved store");
        Ok(())
    }

    /// Every stored row, summary anchors included.
    pub async fn rows(&self, user_id: Option<&str>) -> Result<Vec<StoredTransaction>> {
        let file = self.load().await?;
        Ok(file
            .transactions
            .into_iter()
            .filter(|r| user_id.is_none_or(|u| r.user_id == u))
            .collect())
    }

    pub async fn statements(&self) -> Result<Vec<Statement>> {
        Ok(self.load().await?.statements)
    }
}

#[async_trait]
impl TransactionStore for JsonFileStore {
    async fn insert_transactions(
        &self,
        user_id: &str,
        txns: Vec<Transaction>,
    ) -> Result<Vec<StoredTransaction>> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let mut out = Vec::with_capacity(txns.len());
        for transaction in txns {
            file.next_id += 1;
            let row = StoredTransaction {
                id: file.next_id,
                user_id: user_id.to_string(),
                transaction,
            };
            file.transactions.push(row.clone());
            out.push(row);
        }
        self.save(&file).await?;
        Ok(out)
    }

    async fn find_transactions(&self, filter: &TransactionFilter) -> Result<Vec<StoredTransaction>> {
        let file = self.load().await?;
        Ok(file
            .transactions
            .into_iter()
            .filter(|r| r.user_id == filter.user_id && filter.matches(&r.transaction))
            .collect())
    }

    async fn update_transaction_category(&self, id: u64, category: Category) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let row = file
            .transactions
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::ExternalService(format!("transaction {id} not found")))?;
        row.transaction.category = category;
        self.save(&file).await
    }

    async fn delete_transactions_by_statement(&self, statement_id: &str) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        let before = file.transactions.len();
        file.transactions
            .retain(|r| r.transaction.statement_ref.as_deref() != Some(statement_id));
        file.statements.retain(|s| s.statement_id != statement_id);
        let removed = before - file.transactions.len();
        self.save(&file).await?;
        Ok(removed)
    }

    async fn insert_statement(&self, statement: Statement) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.load().await?;
        file.statements.retain(|s| s.statement_id != statement.statement_id);
        file.statements.push(statement);
        self.save(&file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pesa_core::{Format, Source, TxType};

    fn temp_store(name: &str) -> JsonFileStore {
        let dir = std::env::temp_dir().join(format!("pesa-store-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        JsonFileStore::new(dir.join("transactions.json"))
    }

    fn txn(id: &str, stmt: Option<&str>) -> Transaction {
        let at = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap().and_hms_opt(9, 0, 0).unwrap();
        Transaction::new(id, at, TxType::Sent, 100.0, Source::Pdf, Format::PdfSummary)
            .with_statement_ref(stmt.map(str::to_string))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let store = temp_store("empty");
        assert!(store.rows(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_persist_across_instances() {
        let store = temp_store("ids");
        store.insert_transactions("u1", vec![txn("a", None)]).await.unwrap();

        let reopened = JsonFileStore::new(store.path().to_path_buf());
        let rows = reopened.insert_transactions("u1", vec![txn("b", None)]).await.unwrap();
        assert_eq!(rows[0].id, 2);
        assert_eq!(reopened.rows(Some("u1")).await.unwrap().len(), 2);
        assert!(reopened.rows(Some("u2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_by_statement() {
        let store = temp_store("delete");
        let rows = store
            .insert_transactions("u1", vec![txn("a", Some("S1")), txn("b", Some("S2"))])
            .await
            .unwrap();
        store.update_transaction_category(rows[1].id, Category::Bills).await.unwrap();
        assert!(store.update_transaction_category(99, Category::Food).await.is_err());

        assert_eq!(store.delete_transactions_by_statement("S1").await.unwrap(), 1);
        let left = store.rows(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].transaction.category, Category::Bills);
    }

    #[tokio::test]
    async fn test_statements_listed_until_deleted() {
        let store = temp_store("statements");
        let txns = vec![txn("a", Some("S1")), txn("b", Some("S1"))];
        let created = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let statement = Statement::from_transactions("S1", "u1", Source::Pdf, &txns, created);
        store.insert_statement(statement).await.unwrap();
        store.insert_transactions("u1", txns).await.unwrap();

        let listed = store.statements().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].statement_id, "S1");
        assert_eq!(listed[0].totals.total_expenses, 200.0);

        assert_eq!(store.delete_transactions_by_statement("S1").await.unwrap(), 2);
        assert!(store.statements().await.unwrap().is_empty());
    }
}
