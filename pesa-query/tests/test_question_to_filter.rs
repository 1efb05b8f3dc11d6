use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use pesa_core::{Category, Format, MemoryStore, Source, Transaction, TransactionStore, TxType};
use pesa_query::{build_transaction_filter, extract_query_intent_at, Intent};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 17)
        .unwrap()
        .and_hms_opt(15, 30, 0)
        .unwrap()
}

fn txn(id: &str, month: u32, day: u32, amount: f64, category: Category) -> Transaction {
    let at = NaiveDate::from_ymd_opt(2024, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    Transaction::new(id, at, TxType::Payment, amount, Source::Sms, Format::BusinessPayment)
        .with_category(category)
}

#[test]
fn test_food_last_month_filter() {
    let qi = extract_query_intent_at("How much did I spend on food last month?", now());
    assert_eq!(qi.primary_intent, Intent::Spending);

    let filter = build_transaction_filter("u1", &qi.entities);
    let food: BTreeSet<_> = [Category::Food].into_iter().collect();
    assert_eq!(filter.categories, Some(food));
    let range = filter.date.unwrap();
    assert_eq!(range.start.to_string(), "2024-06-01 00:00:00");
    assert_eq!(range.end.to_string(), "2024-06-30 23:59:59");
    assert!(filter.amount.is_none());
}

#[test]
fn test_amount_phrases_reach_filter() {
    let qi = extract_query_intent_at("transport payments between 100 and 500 in March", now());
    let filter = build_transaction_filter("u1", &qi.entities);
    let amount = filter.amount.unwrap();
    assert_eq!((amount.min, amount.max), (Some(100.0), Some(500.0)));
    assert_eq!(filter.date.unwrap().start.to_string(), "2024-03-01 00:00:00");

    let qi = extract_query_intent_at("show transactions over 1,000", now());
    let amount = build_transaction_filter("u1", &qi.entities).amount.unwrap();
    assert_eq!((amount.min, amount.max), (Some(1000.0), None));
}

#[tokio::test]
async fn test_filter_runs_against_store() {
    let store = MemoryStore::new();
    store
        .insert_transactions(
            "u1",
            vec![
                txn("A1", 6, 3, 450.0, Category::Food),
                txn("A2", 6, 20, 1200.0, Category::Food),
                txn("A3", 6, 21, 900.0, Category::Transport),
                txn("A4", 7, 2, 300.0, Category::Food),
            ],
        )
        .await
        .unwrap();
    store
        .insert_transactions("u2", vec![txn("B1", 6, 5, 700.0, Category::Food)])
        .await
        .unwrap();

    let qi = extract_query_intent_at("What did I spend eating out last month, over 1000?", now());
    let filter = build_transaction_filter("u1", &qi.entities);
    let rows = store.find_transactions(&filter).await.unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r.transaction.transaction_id.as_str()).collect();
    assert_eq!(ids, ["A2"]);
}
