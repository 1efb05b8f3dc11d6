use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use pesa_core::{
    categorize_or_keep, Category, MemoryStore, Source, Statement, TransactionFilter,
    TransactionStore, TxType,
};
use pesa_ingest::{
    parse_pdf, parse_sms_at, parse_sms_batch_at, PdfInput, PdfOptions, RuleCategorizer,
    SummaryLine,
};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

#[test]
fn test_received_sms_end_to_end() {
    let out = parse_sms_at(
        "QWE123ABC Confirmed. You have received Ksh1,500.00 from JANE DOE 254700000000 on 5/6/24 at 2:30 PM. New M-PESA balance is Ksh10,000.00.",
        now(),
    );
    assert!(out.ok);
    let t = out.transaction.expect("single transaction");
    assert_eq!(t.transaction_id, "QWE123ABC");
    assert_eq!(t.tx_type, TxType::Received);
    assert_eq!(t.amount, 1500.0);
    assert_eq!(t.balance, Some(10000.0));
    assert_eq!(t.counterparty, "JANE DOE 254700000000");
    assert_eq!(t.date.to_string(), "2024-06-05 14:30:00");
    assert_eq!(t.confidence, 1.0);
    assert_eq!(t.source, Source::Sms);
    assert_eq!(t.category, Category::Other);
}

#[test]
fn test_combined_statement_yields_one_record_per_block() {
    let sms = "TFH12ABC34 Confirmed. \
        [20240605; ;Bundle Purchase;SAFARICOM;50.00]Completed\
        [20240606; ;Customer Transfer;JOHN DOE;1,000.00]Completed\
        [20240607; ;Pay Bill Online;KPLC PREPAID;2,300.00]Completed";
    let out = parse_sms_at(sms, now());
    assert!(out.ok);

    let ids: Vec<_> = out.transactions.iter().map(|t| t.transaction_id.as_str()).collect();
    assert_eq!(ids, ["TFH12ABC34-1", "TFH12ABC34-2", "TFH12ABC34-3"]);

    let cats: Vec<_> = out.transactions.iter().map(|t| t.category).collect();
    assert_eq!(cats, [Category::Utilities, Category::Transfer, Category::Bills]);
    assert_eq!(out.transactions[1].tx_type, TxType::Sent);
    assert_eq!(out.transactions[2].amount, 2300.0);
    assert!(out.transactions.iter().all(|t| t.balance.is_none()));
}

#[test]
fn test_synthesized_pdf_types_are_always_valid() {
    let june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let inputs = [
        PdfInput::Absent,
        PdfInput::Rows(vec![
            SummaryLine::new("Reversal", 120.0, 120.0),
            SummaryLine::new("Something Unusual", 0.0, 75.5),
            SummaryLine::new("Negative Glitch", -40.0, 10.0),
        ]),
    ];
    for input in &inputs {
        let out = parse_pdf(input, june, &PdfOptions::default());
        assert!(out.ok);
        for t in &out.transactions {
            assert!(t.tx_type.is_valid(), "{} has type {:?}", t.transaction_id, t.tx_type);
            assert!(t.amount >= 0.0);
            assert_eq!(t.source, Source::Pdf);
        }
    }
}

#[test]
fn test_pdf_dates_are_deterministic_and_in_month() {
    let june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let a = parse_pdf(&PdfInput::Absent, june, &PdfOptions::default());
    let b = parse_pdf(&PdfInput::Absent, june, &PdfOptions::default());
    let dates_a: Vec<_> = a.transactions.iter().map(|t| t.date).collect();
    let dates_b: Vec<_> = b.transactions.iter().map(|t| t.date).collect();
    assert_eq!(dates_a, dates_b);
    assert!(dates_a.iter().all(|d| d.date() >= NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        && d.date() <= june));
}

#[test]
fn test_outcomes_serialize_for_callers() {
    let ok = parse_sms_at(
        "QWE123ABC Confirmed. You have received Ksh1,500.00 from JANE DOE 254700000000 on 5/6/24 at 2:30 PM.",
        now(),
    );
    let json = serde_json::to_value(&ok).unwrap();
    assert_eq!(json["ok"], true);
    assert!(json.get("error").is_none());
    assert_eq!(json["transaction"]["type"], "RECEIVED");
    assert_eq!(json["transaction"]["balance"], serde_json::Value::Null);

    let failed = serde_json::to_value(parse_sms_at("Your OTP is 123456", now())).unwrap();
    assert_eq!(failed["ok"], false);
    assert_eq!(failed["error"]["kind"], "unsupported_format");
    assert!(failed.get("transaction").is_none());

    let june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let pdf = serde_json::to_value(parse_pdf(&PdfInput::Absent, june, &PdfOptions::default())).unwrap();
    assert!(pdf.get("error").is_none());
    assert_eq!(pdf["statement_ref"], "PDF20240630");
    assert_eq!(pdf["stats"]["sample_data"], true);
}

#[tokio::test]
async fn test_batch_categorize_store_and_query() {
    let block = "\
SBL9K2M4TT Confirmed. Ksh1,250.00 paid to NAIVAS SUPERMARKET. on 2/6/2024 at 12:15 PM.New M-PESA balance is Ksh3,100.50.
RKT4ZX81PQ Confirmed. Ksh500.00 sent to JOHN KAMAU 0712345678 on 12/6/24 at 9:05 AM. New M-PESA balance is Ksh9,500.00.
not an mpesa message
";
    let batch = parse_sms_batch_at(block, now());
    assert_eq!(batch.parsed, 2);

    let txns = categorize_or_keep(&RuleCategorizer, batch.transactions()).await;
    assert_eq!(txns[0].category, Category::Food);

    let store = MemoryStore::new();
    let stored = store.insert_transactions("u1", txns).await.unwrap();
    assert_eq!(stored.len(), 2);

    let food: BTreeSet<_> = [Category::Food].into_iter().collect();
    let filter = TransactionFilter::build("u1", None, None, Some(&food), Some(1000.0), None);
    let found = store.find_transactions(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].transaction.counterparty, "NAIVAS SUPERMARKET");
}

#[tokio::test]
async fn test_pdf_statement_round_trip_through_store() {
    let june = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let out = parse_pdf(&PdfInput::Absent, june, &PdfOptions::default());
    let statement_ref = out.statement_ref.clone().unwrap();

    let store = MemoryStore::new();
    let statement =
        Statement::from_transactions(&statement_ref, "u1", Source::Pdf, &out.transactions, now());
    assert_eq!(statement.totals.total_income, out.stats.total_income);
    store.insert_statement(statement).await.unwrap();
    let inserted = store.insert_transactions("u1", out.transactions).await.unwrap().len();

    let all = TransactionFilter::build("u1", None, None, None, None, None);
    let visible = store.find_transactions(&all).await.unwrap();
    assert_eq!(visible.len(), inserted - 1);

    let removed = store.delete_transactions_by_statement(&statement_ref).await.unwrap();
    assert_eq!(removed, inserted);
    assert!(store.statements().unwrap().is_empty());
}
