//! Transaction record types produced by the SMS and PDF engines.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::statement::StatementTotals;

/// Scores below this mean the record should be verified by a human.
pub const VERIFICATION_THRESHOLD: f64 = 0.6;

/// Description prefix carried by the synthetic statement summary record.
pub const SUMMARY_MARKER: &str = "[STATEMENT SUMMARY]";

/// A single money movement, extracted or synthesized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Unique within one user's dataset; synthesized when the source has none
    pub transaction_id: String,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    /// Always non-negative; direction lives in `tx_type`
    pub amount: f64,
    /// Running balance reported by the source, never assumed zero
    pub balance: Option<f64>,
    pub counterparty: String,
    pub description: String,
    pub category: Category,
    pub source: Source,
    /// Completeness heuristic in [0.0, 1.0]
    pub confidence: f64,
    /// Extraction template that produced the record
    pub format: Format,
    pub statement_ref: Option<String>,
    /// Present only on the synthetic statement summary record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<StatementTotals>,
}

/// Direction/kind of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TxType {
    Sent,
    Received,
    Payment,
    Withdrawal,
    Deposit,
    Other,
}

impl TxType {
    /// Map an external label onto the enum; anything unknown becomes `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "SENT" => TxType::Sent,
            "RECEIVED" => TxType::Received,
            "PAYMENT" => TxType::Payment,
            "WITHDRAWAL" => TxType::Withdrawal,
            "DEPOSIT" => TxType::Deposit,
            _ => TxType::Other,
        }
    }

    /// `Other` is a placeholder that must be repaired before persistence.
    pub fn is_valid(&self) -> bool {
        !matches!(self, TxType::Other)
    }

    pub fn is_income(&self) -> bool {
        matches!(self, TxType::Received | TxType::Deposit)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, TxType::Sent | TxType::Payment | TxType::Withdrawal)
    }
}

/// Fixed spending taxonomy shared by ingestion and question parsing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "FOOD")]
    Food,
    #[serde(rename = "TRANSPORT")]
    Transport,
    #[serde(rename = "UTILITIES")]
    Utilities,
    #[serde(rename = "ENTERTAINMENT")]
    Entertainment,
    #[serde(rename = "SHOPPING")]
    Shopping,
    #[serde(rename = "HEALTH")]
    Health,
    #[serde(rename = "EDUCATION")]
    Education,
    #[serde(rename = "HOUSING")]
    Housing,
    #[serde(rename = "BILLS")]
    Bills,
    #[serde(rename = "TRANSFER")]
    Transfer,
    #[serde(rename = "INCOME")]
    Income,
    #[serde(rename = "OTHER")]
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Shopping,
        Category::Health,
        Category::Education,
        Category::Housing,
        Category::Bills,
        Category::Transfer,
        Category::Income,
        Category::Other,
    ];

    /// Bare lowercase name, as a user would type it.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Education => "education",
            Category::Housing => "housing",
            Category::Bills => "bills",
            Category::Transfer => "transfer",
            Category::Income => "income",
            Category::Other => "other",
        }
    }

    /// Parse a category label from an external service (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_ascii_lowercase();
        Category::ALL.into_iter().find(|c| c.name() == label)
    }
}

/// Where a transaction came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Source {
    Sms,
    Pdf,
    Manual,
    Test,
}

/// Extraction template tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Format {
    Received,
    Sent,
    BusinessPayment,
    Withdrawal,
    Airtime,
    CombinedStatement,
    PdfSummary,
    Manual,
}

impl Transaction {
    /// Create a transaction with empty text fields and category `Other`.
    pub fn new(
        transaction_id: impl Into<String>,
        date: NaiveDateTime,
        tx_type: TxType,
        amount: f64,
        source: Source,
        format: Format,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            date,
            tx_type,
            amount: if amount.is_finite() { amount.abs() } else { 0.0 },
            balance: None,
            counterparty: String::new(),
            description: String::new(),
            category: Category::Other,
            source,
            confidence: 0.0,
            format,
            statement_ref: None,
            summary: None,
        }
    }

    pub fn with_balance(mut self, balance: Option<f64>) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = counterparty.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_statement_ref(mut self, statement_ref: Option<String>) -> Self {
        self.statement_ref = statement_ref;
        self
    }

    /// Low-confidence records should be confirmed before they drive totals.
    pub fn needs_verification(&self) -> bool {
        self.confidence < VERIFICATION_THRESHOLD
    }

    /// True for the synthetic per-statement audit record.
    pub fn is_summary_anchor(&self) -> bool {
        self.summary.is_some()
    }
}
