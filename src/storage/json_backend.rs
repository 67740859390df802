use std::{
    fs::{self, File},
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};
use tracing::{debug, info, warn};

use crate::{
    core::utils::{ensure_dir, tmp_path},
    errors::{LedgerError, Result},
    ledger::{Ledger, BALANCE_KEY, DOCUMENT_KEYS, OPERATIONS_KEY},
};

use super::{LoadOrigin, LoadReport, StorageBackend};

const INDENT: &[u8] = b"    ";

/// Keeps the ledger in one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<LoadReport> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "store not found, starting with defaults");
                return Ok(LoadReport::fresh());
            }
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return Err(LedgerError::CorruptStore {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        let report = decode_document(&raw, &self.path)?;
        info!(
            path = %self.path.display(),
            operations = report.ledger.operations().operation_count(),
            "store loaded"
        );
        Ok(report)
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = encode_document(ledger)?;
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        write_atomic(&self.path, &json).map_err(|source| LedgerError::SaveFailed {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = json.len(), "store saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Serializes the document with a four-space indent. A non-finite balance
/// would be written as `null` and fail to load, so it is refused.
pub fn encode_document(ledger: &Ledger) -> Result<String> {
    if !ledger.balance().is_finite() {
        return Err(LedgerError::malformed(format!(
            "refusing to store a non-finite balance ({})",
            ledger.balance()
        )));
    }
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    ledger.serialize(&mut serializer)?;
    String::from_utf8(buffer).map_err(|err| io::Error::new(ErrorKind::InvalidData, err).into())
}

/// Decodes a stored document, repairing missing top-level keys and
/// normalizing date keys. `origin` only labels errors.
pub fn decode_document(raw: &str, origin: &Path) -> Result<LoadReport> {
    let corrupt = |reason: String| LedgerError::CorruptStore {
        path: origin.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_str(raw).map_err(|err| corrupt(err.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(corrupt("top-level value is not an object".into()));
    };

    let mut warnings = Vec::new();
    let unknown: Vec<String> = object
        .keys()
        .filter(|key| !DOCUMENT_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    for key in unknown {
        object.remove(&key);
        warn!(key = %key, "ignoring unknown top-level key");
        warnings.push(format!("ignored unknown top-level key `{key}`"));
    }

    let repaired_keys: Vec<String> = DOCUMENT_KEYS
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    for key in &repaired_keys {
        warn!(key = %key, "missing key restored with its default");
    }
    let assigned_ids = count_missing_ids(&object);

    let mut ledger: Ledger =
        serde_json::from_value(Value::Object(object)).map_err(|err| corrupt(err.to_string()))?;
    let rewritten_keys = ledger.normalize().map_err(|err| corrupt(err.to_string()))?;
    let duplicate_categories = ledger.dedup_categories();
    if duplicate_categories > 0 {
        warn!(duplicate_categories, "repeated category names removed");
        warnings.push(format!(
            "removed {duplicate_categories} repeated category name(s)"
        ));
    }

    if repaired_keys.iter().any(|key| key == BALANCE_KEY) {
        let total = ledger.recompute_balance();
        info!(balance = total, "balance rebuilt from operations");
    } else {
        let drift = ledger.balance_drift();
        if drift != 0.0 {
            warn!(drift, "stored balance differs from the sum of operations");
            warnings.push(format!(
                "stored balance differs from the sum of operations by {drift:.2}; \
                 run `balance reconcile` to fix it"
            ));
        }
    }

    Ok(LoadReport {
        ledger,
        origin: LoadOrigin::Existing,
        repaired_keys,
        rewritten_keys,
        assigned_ids,
        duplicate_categories,
        warnings,
    })
}

fn count_missing_ids(object: &Map<String, Value>) -> usize {
    let Some(Value::Object(years)) = object.get(OPERATIONS_KEY) else {
        return 0;
    };
    years
        .values()
        .filter_map(Value::as_object)
        .flat_map(|months| months.values())
        .filter_map(Value::as_object)
        .flat_map(|days| days.values())
        .filter_map(Value::as_array)
        .flatten()
        .filter(|op| op.get("id").is_none())
        .count()
}

fn write_atomic(path: &Path, data: &str) -> io::Result<()> {
    let tmp = tmp_path(path);
    let staged = File::create(&tmp).and_then(|mut file| {
        file.write_all(data.as_bytes())?;
        file.sync_all()
    });
    if let Err(err) = staged.and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}
