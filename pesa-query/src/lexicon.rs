//! Financial vocabulary and intent keyword groups.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::intent::Intent;

/// Terms that mark a question as being about money.
pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "money", "spend", "spent", "spending", "expense", "expenses", "income", "salary",
    "balance", "transaction", "transactions", "payment", "payments", "paid", "pay", "bill",
    "bills", "budget", "save", "saving", "savings", "cost", "cash", "mpesa", "m-pesa", "ksh",
    "kes", "shillings", "bought", "buy", "purchase", "purchases", "sent", "received",
    "deposit", "withdraw", "withdrawal", "earn", "earned", "debt", "loan", "afford",
    "finance", "financial", "account", "transfer", "rent", "food", "transport", "shopping",
];

static FINANCIAL_RE: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = FINANCIAL_KEYWORDS.iter().map(|k| regex::escape(k)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|")))
        .expect("valid financial keyword regex")
});

pub fn is_financial(question: &str) -> bool {
    FINANCIAL_RE.is_match(question)
}

static BALANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:balance|how much (?:money )?(?:do i have|have i got|is left|is remaining)|left in my (?:account|wallet|m-?pesa)|remaining funds)\b",
    )
    .expect("valid balance regex")
});

static SPENDING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:spen[dt]|spending|expenses?|expenditure|paid|payments?|bought|purchases?|cost|outflow)\b",
    )
    .expect("valid spending regex")
});

static INCOME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:income|earn(?:ed|ings)?|salary|wages|received|receive|deposits?|inflow|made)\b")
        .expect("valid income regex")
});

static CATEGORY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:categor(?:y|ies|ize)|breakdown|break down|where does my money go|what do i spend on)\b")
        .expect("valid category regex")
});

static TREND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:trends?|over time|compared?|comparison|increas(?:e|ed|ing)|decreas(?:e|ed|ing)|month over month|patterns?|changed?)\b",
    )
    .expect("valid trend regex")
});

static ADVICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:advice|advise|should i|tips?|recommend(?:ation)?s?|budget(?:ing)?|afford|save more|cut back|reduce)\b",
    )
    .expect("valid advice regex")
});

/// Intent groups in priority order; the first group that matches wins.
pub static INTENT_GROUPS: Lazy<[(Intent, &'static Regex); 6]> = Lazy::new(|| {
    [
        (Intent::Balance, &*BALANCE_RE),
        (Intent::Spending, &*SPENDING_RE),
        (Intent::Income, &*INCOME_RE),
        (Intent::Category, &*CATEGORY_RE),
        (Intent::Trend, &*TREND_RE),
        (Intent::Advice, &*ADVICE_RE),
    ]
});

pub fn primary_intent(question: &str) -> Intent {
    INTENT_GROUPS
        .iter()
        .find(|(_, re)| re.is_match(question))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}
