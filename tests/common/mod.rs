#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use expense_tracker::{ledger::DatePath, storage::JsonStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// JSON backend pointing at `database.json` inside a fresh directory.
pub fn temp_store() -> (JsonStorage, PathBuf) {
    let path = temp_dir().join("database.json");
    (JsonStorage::new(&path), path)
}

pub fn date(raw: &str) -> DatePath {
    raw.parse().expect("valid date")
}
