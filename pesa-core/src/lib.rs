//! pesa-core: transaction types, normalization and collaborator contracts
//! shared by the SMS/PDF ingest engines and the question parser.

pub mod categorizer;
pub mod error;
pub mod filter;
pub mod finance;
pub mod normalize;
pub mod statement;
pub mod store;

pub use categorizer::{categorize, matching_categories, CATEGORY_KEYWORDS};
pub use error::{Error, Result};
pub use filter::{AmountThresholds, DateRange, TransactionFilter};
pub use finance::{
    Category, Format, Source, Transaction, TxType, SUMMARY_MARKER, VERIFICATION_THRESHOLD,
};
pub use statement::{Statement, StatementTotals};
pub use store::{categorize_or_keep, Categorizer, MemoryStore, StoredTransaction, TransactionStore};
