pub mod json_backend;
pub mod memory;

use std::sync::Arc;

use crate::{errors::Result, ledger::Ledger};

pub use json_backend::{decode_document, encode_document, JsonStorage};
pub use memory::MemoryStorage;

/// Abstraction over persistence backends that hold a single ledger document.
pub trait StorageBackend: Send + Sync {
    /// Reads the document. A missing document is not an error: it yields a
    /// fresh ledger with `LoadOrigin::Fresh`.
    fn load(&self) -> Result<LoadReport>;
    /// Replaces the whole stored document.
    fn save(&self, ledger: &Ledger) -> Result<()>;
    /// Human readable location used in log lines and messages.
    fn location(&self) -> String;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn load(&self) -> Result<LoadReport> {
        (**self).load()
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        (**self).save(ledger)
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// The document existed and was decoded.
    Existing,
    /// No document was found; defaults were used.
    Fresh,
}

/// Outcome of a load: the ledger plus what had to be repaired on the way.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub ledger: Ledger,
    pub origin: LoadOrigin,
    pub repaired_keys: Vec<String>,
    pub rewritten_keys: usize,
    pub assigned_ids: usize,
    pub duplicate_categories: usize,
    pub warnings: Vec<String>,
}

impl LoadReport {
    pub fn fresh() -> Self {
        Self {
            ledger: Ledger::new(),
            origin: LoadOrigin::Fresh,
            repaired_keys: Vec::new(),
            rewritten_keys: 0,
            assigned_ids: 0,
            duplicate_categories: 0,
            warnings: Vec::new(),
        }
    }

    /// Whether the in-memory ledger differs from what is stored.
    pub fn needs_save(&self) -> bool {
        self.origin == LoadOrigin::Fresh
            || !self.repaired_keys.is_empty()
            || self.rewritten_keys > 0
            || self.assigned_ids > 0
            || self.duplicate_categories > 0
    }
}
