use assert_cmd::Command;
use assert_fs::{fixture::ChildPath, prelude::*, TempDir};
use predicates::prelude::*;
use predicates::str::contains;

fn read(file: &ChildPath) -> String {
    std::fs::read_to_string(file.path()).expect("read file")
}

fn script(home: &TempDir, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("expense_tracker_cli")
        .unwrap()
        .env("EXPENSE_TRACKER_HOME", home.path())
        .env("EXPENSE_TRACKER_CLI_SCRIPT", "1")
        .env("EXPENSE_TRACKER_TODAY", "2024-03-15")
        .env_remove("RUST_LOG")
        .write_stdin(input)
        .assert()
}

#[test]
fn script_mode_records_and_persists_operations() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "add today -50\nadd 2024-03-02 -20 taxes\nadd 2024-03-03 30 groceries\nhistory month=3\nexit\n",
    )
    .success()
    .stdout(contains("Created a new store"))
    .stdout(contains("Year: All    Month: 03    Day: All"))
    .stdout(contains("2024/03/15"))
    .stdout(contains("Balance: -40.00"));

    let store = home.child("database.json");
    store.assert(predicate::path::exists());
    let raw = read(&store);
    assert!(raw.contains("\"balance\": -40.0"));
    assert!(raw.contains("\"15\""));
}

#[test]
fn summary_reports_current_month_split() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "add today -50\nadd today -20\nadd today 30\nsummary\nstats\n",
    )
    .success()
    .stdout(contains("70.00"))
    .stdout(contains("70.0%"))
    .stdout(contains("Month total: -40.00"));
}

#[test]
fn empty_month_has_no_data() {
    let home = TempDir::new().unwrap();
    script(&home, "summary\nyears\n")
        .success()
        .stdout(contains("No data for current month"))
        .stdout(contains("2024"));
}

#[test]
fn errors_are_reported_without_stopping_the_script() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "add today abc\nadd today 5 nonexistent\ncategory add taxes\ndelete 2024-03-15 0\nhstory\ncategory add rent\nadd today 5 rent\n",
    )
    .success()
    .stderr(contains("not numeric"))
    .stderr(contains("Unknown category `nonexistent`"))
    .stderr(contains("Category `taxes` already exists"))
    .stderr(contains("No operation #0 on 2024-03-15"))
    .stderr(contains("Did you mean `history`?"))
    .stdout(contains("Category `rent` added."))
    .stdout(contains("Balance: 5.00"));
}

#[test]
fn corrupt_store_aborts_and_is_left_alone() {
    let home = TempDir::new().unwrap();
    let store = home.child("database.json");
    store.write_str("{ definitely not json").unwrap();

    script(&home, "add today 5\n")
        .failure()
        .stderr(contains("Cannot read store"));

    store.assert("{ definitely not json");
}

#[test]
fn config_changes_default_category() {
    let home = TempDir::new().unwrap();
    script(
        &home,
        "category add travel\nconfig set default_category travel\nadd today -12\nhistory\n",
    )
    .success()
    .stdout(contains("Updated `default_category`."))
    .stdout(contains("travel"));

    let config = read(&home.child("config.json"));
    assert!(config.contains("\"default_category\": \"travel\""));
}

#[test]
fn store_path_override_is_honored() {
    let home = TempDir::new().unwrap();
    home.child("config.json")
        .write_str(r#"{"store_path": "books/household.json"}"#)
        .unwrap();

    script(&home, "add 2024-01-01 10\n").success();

    let raw = read(&home.child("books/household.json"));
    assert!(raw.contains("\"balance\": 10.0"));
    home.child("database.json").assert(predicate::path::missing());
}
