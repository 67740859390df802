use std::{
    io,
    path::PathBuf,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    errors::{LedgerError, Result},
    ledger::Ledger,
};

use super::{decode_document, encode_document, LoadReport, StorageBackend};

const MEMORY_LOCATION: &str = ":memory:";

#[derive(Debug, Default)]
struct MemoryState {
    document: Option<String>,
    fail_saves: bool,
    saves: usize,
}

/// Keeps the encoded document in memory. Saves can be made to fail on
/// demand, which lets callers exercise their recovery paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.state().document = Some(raw.into());
        storage
    }

    pub fn document(&self) -> Option<String> {
        self.state().document.clone()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.state().fail_saves = fail;
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.state().saves
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<LoadReport> {
        match self.document() {
            Some(raw) => decode_document(&raw, &PathBuf::from(MEMORY_LOCATION)),
            None => Ok(LoadReport::fresh()),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut state = self.state();
        if state.fail_saves {
            return Err(LedgerError::SaveFailed {
                path: PathBuf::from(MEMORY_LOCATION),
                source: io::Error::new(io::ErrorKind::Other, "saves are disabled"),
            });
        }
        state.document = Some(encode_document(ledger)?);
        state.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        MEMORY_LOCATION.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LoadOrigin;

    #[test]
    fn failing_save_keeps_previous_document() {
        let storage = MemoryStorage::new();
        storage.save(&Ledger::new()).unwrap();
        let before = storage.document();

        storage.set_fail_saves(true);
        let mut ledger = Ledger::new();
        ledger.set_balance(10.0);
        assert!(matches!(
            storage.save(&ledger),
            Err(LedgerError::SaveFailed { .. })
        ));
        assert_eq!(storage.document(), before);
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn seeded_document_is_decoded() {
        let storage = MemoryStorage::with_document(r#"{"Categories": ["rent"]}"#);
        let report = storage.load().unwrap();
        assert_eq!(report.origin, LoadOrigin::Existing);
        assert_eq!(report.repaired_keys, vec!["Operations", "balance"]);
        assert!(report.ledger.categories().contains("rent"));
    }
}
