mod common;

use chrono::NaiveDate;
use common::date;
use expense_tracker::{
    core::services::{CategoryService, OperationService, SummaryService},
    ledger::{Ledger, OperationFilter},
    storage::{decode_document, encode_document},
};
use std::path::Path;

#[test]
fn balance_tracks_every_mutation() {
    let mut ledger = Ledger::new();
    let days = ["2024-01-01", "2024-01-01", "2024-02-10", "2023-12-31"];
    for (step, day) in days.iter().enumerate() {
        OperationService::add(&mut ledger, &date(day), step as f64 * 10.5 - 12.0, "taxes").unwrap();
        assert_eq!(ledger.balance_drift(), 0.0);
    }

    OperationService::update(&mut ledger, &date("2024-01-01"), 1, -3.25, "groceries").unwrap();
    assert_eq!(ledger.balance_drift(), 0.0);
    OperationService::remove(&mut ledger, &date("2024-01-01"), 0).unwrap();
    assert_eq!(ledger.balance_drift(), 0.0);

    let expected: f64 = ledger.operations().operations().map(|op| op.value).sum();
    assert!((ledger.balance() - expected).abs() < 1e-9);
}

#[test]
fn deleting_last_operation_prunes_day_month_and_year() {
    let mut ledger = Ledger::new();
    OperationService::add(&mut ledger, &date("2024-01-01"), -5.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2023-06-01"), 1.0, "shopping").unwrap();

    OperationService::remove(&mut ledger, &date("2024-01-01"), 0).unwrap();

    let json = encode_document(&ledger).unwrap();
    assert!(!json.contains("\"2024\""));
    assert_eq!(ledger.operations().years().collect::<Vec<_>>(), vec!["2023"]);
}

#[test]
fn pruning_keeps_siblings() {
    let mut ledger = Ledger::new();
    OperationService::add(&mut ledger, &date("2024-01-01"), 1.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2024-01-02"), 2.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2024-02-01"), 3.0, "shopping").unwrap();

    OperationService::remove(&mut ledger, &date("2024-01-01"), 0).unwrap();
    let january = ledger.operations().month("2024", "01").expect("january kept");
    assert_eq!(january.keys().collect::<Vec<_>>(), vec!["02"]);

    OperationService::remove(&mut ledger, &date("2024-01-02"), 0).unwrap();
    assert!(ledger.operations().month("2024", "01").is_none());
    assert!(ledger.operations().month("2024", "02").is_some());
}

#[test]
fn year_filter_returns_exact_subtree() {
    let mut ledger = Ledger::new();
    OperationService::add(&mut ledger, &date("2024-03-01"), 1.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2024-04-02"), 2.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2023-03-01"), 4.0, "shopping").unwrap();

    let filter = OperationFilter::all().year("2024").unwrap();
    let subtree = OperationService::query(&ledger, &filter);
    assert_eq!(subtree.years().collect::<Vec<_>>(), vec!["2024"]);
    assert_eq!(subtree.total(), 3.0);
    assert_eq!(
        subtree.month("2024", "04"),
        ledger.operations().month("2024", "04")
    );

    let everything = OperationService::query(&ledger, &OperationFilter::all());
    assert_eq!(&everything, ledger.operations());
}

#[test]
fn month_filter_spans_years() {
    let mut ledger = Ledger::new();
    OperationService::add(&mut ledger, &date("2024-03-01"), 1.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2023-03-09"), 2.0, "shopping").unwrap();
    OperationService::add(&mut ledger, &date("2023-04-09"), 4.0, "shopping").unwrap();

    let filter = OperationFilter::all().month("March").unwrap();
    let entries = OperationService::entries(&ledger, &filter);
    let dates: Vec<String> = entries.iter().map(|entry| entry.date.to_string()).collect();
    assert_eq!(dates, vec!["2023-03-09", "2024-03-01"]);
}

#[test]
fn category_added_twice_is_stored_once() {
    let mut ledger = Ledger::new();
    CategoryService::add(&mut ledger, "food").unwrap();
    assert!(CategoryService::add(&mut ledger, "food").is_err());
    let count = ledger
        .categories()
        .iter()
        .filter(|name| *name == "food")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn current_month_split_is_seventy_thirty() {
    let mut ledger = Ledger::new();
    for value in [-50.0, -20.0, 30.0] {
        OperationService::add(&mut ledger, &date("2024-07-04"), value, "shopping").unwrap();
    }
    let today = NaiveDate::from_ymd_opt(2024, 7, 20).unwrap();
    let split = SummaryService::current_month_split(&ledger, today);
    assert_eq!((split.spending, split.earning), (70.0, 30.0));
}

#[test]
fn years_are_ordered_after_out_of_order_inserts() {
    let mut ledger = Ledger::new();
    for year in ["2023", "2021", "2022"] {
        OperationService::add(&mut ledger, &date(&format!("{year}-05-05")), 1.0, "shopping")
            .unwrap();
    }
    assert_eq!(
        ledger.operations().years().collect::<Vec<_>>(),
        vec!["2021", "2022", "2023"]
    );

    let json = encode_document(&ledger).unwrap();
    let first = json.find("\"2021\"").unwrap();
    let second = json.find("\"2022\"").unwrap();
    let third = json.find("\"2023\"").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn saving_a_loaded_document_is_byte_identical() {
    let mut ledger = Ledger::new();
    OperationService::add(&mut ledger, &date("2024-01-05"), -19.99, "groceries").unwrap();
    OperationService::add(&mut ledger, &date("2022-11-30"), 1500.0, "taxes").unwrap();
    CategoryService::add(&mut ledger, "eating out").unwrap();

    let first = encode_document(&ledger).unwrap();
    let report = decode_document(&first, Path::new("memory.json")).unwrap();
    assert!(!report.needs_save());
    let second = encode_document(&report.ledger).unwrap();
    assert_eq!(first, second);
}
