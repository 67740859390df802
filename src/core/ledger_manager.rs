use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::services::{CategoryService, OperationService, SpendEarnSplit, SummaryService};
use crate::errors::LedgerError;
use crate::ledger::{DatePath, Ledger, Operation, OperationEntry, OperationFilter, OperationTree};
use crate::storage::{LoadOrigin, LoadReport, StorageBackend};

/// Metadata describing the outcome of opening a store.
#[derive(Debug, Clone)]
pub struct LoadMetadata {
    pub origin: LoadOrigin,
    pub location: String,
    pub repaired_keys: Vec<String>,
    pub rewritten_keys: usize,
    pub warnings: Vec<String>,
}

/// Facade that owns the ledger and persists it after every mutation.
///
/// A failed save leaves the mutation in memory and marks the manager dirty;
/// [`LedgerManager::save`] retries.
pub struct LedgerManager {
    ledger: Ledger,
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    dirty: bool,
}

impl LedgerManager {
    /// Loads the store and writes it back when the load had to repair,
    /// normalize or create it.
    pub fn open(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
    ) -> Result<(Self, LoadMetadata), LedgerError> {
        let report = storage.load()?;
        let needs_save = report.needs_save();
        let LoadReport {
            ledger,
            origin,
            repaired_keys,
            rewritten_keys,
            assigned_ids,
            duplicate_categories,
            mut warnings,
        } = report;
        let location = storage.location();
        let mut manager = Self {
            ledger,
            storage,
            clock,
            dirty: needs_save,
        };
        if needs_save {
            info!(
                location = %location,
                repaired = repaired_keys.len(),
                rewritten_keys,
                assigned_ids,
                duplicate_categories,
                "writing back normalized store"
            );
            if let Err(err) = manager.save() {
                warnings.push(format!("store could not be written: {err}"));
            }
        }
        Ok((
            manager,
            LoadMetadata {
                origin,
                location,
                repaired_keys,
                rewritten_keys,
                warnings,
            },
        ))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn location(&self) -> String {
        self.storage.location()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Writes the whole ledger to the backend.
    pub fn save(&mut self) -> Result<(), LedgerError> {
        match self.storage.save(&self.ledger) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                warn!(location = %self.storage.location(), error = %err, "save failed, changes kept in memory");
                Err(err)
            }
        }
    }

    pub fn add_operation(
        &mut self,
        date: &DatePath,
        value: f64,
        category: &str,
    ) -> Result<Uuid, LedgerError> {
        let id = OperationService::add(&mut self.ledger, date, value, category)?;
        debug!(%date, value, category, %id, "operation added");
        self.persist()?;
        Ok(id)
    }

    pub fn update_operation(
        &mut self,
        date: &DatePath,
        index: usize,
        value: f64,
        category: &str,
    ) -> Result<Operation, LedgerError> {
        let previous = OperationService::update(&mut self.ledger, date, index, value, category)?;
        debug!(%date, index, value, category, "operation updated");
        self.persist()?;
        Ok(previous)
    }

    pub fn update_operation_by_id(
        &mut self,
        id: Uuid,
        value: f64,
        category: &str,
    ) -> Result<OperationEntry, LedgerError> {
        let previous = OperationService::update_by_id(&mut self.ledger, id, value, category)?;
        debug!(%id, value, category, "operation updated");
        self.persist()?;
        Ok(previous)
    }

    pub fn delete_operation(
        &mut self,
        date: &DatePath,
        index: usize,
    ) -> Result<Operation, LedgerError> {
        let removed = OperationService::remove(&mut self.ledger, date, index)?;
        debug!(%date, index, "operation removed");
        self.persist()?;
        Ok(removed)
    }

    pub fn delete_operation_by_id(&mut self, id: Uuid) -> Result<OperationEntry, LedgerError> {
        let removed = OperationService::remove_by_id(&mut self.ledger, id)?;
        debug!(%id, "operation removed");
        self.persist()?;
        Ok(removed)
    }

    pub fn add_category(&mut self, name: &str) -> Result<String, LedgerError> {
        let name = CategoryService::add(&mut self.ledger, name)?;
        debug!(category = %name, "category added");
        self.persist()?;
        Ok(name)
    }

    pub fn set_balance(&mut self, value: f64) -> Result<(), LedgerError> {
        crate::ledger::operation::ensure_finite(value)?;
        self.ledger.set_balance(value);
        debug!(value, "balance overridden");
        self.persist()
    }

    /// Replaces the stored balance with the sum of all operations and
    /// returns `(previous, current)`.
    pub fn reconcile_balance(&mut self) -> Result<(f64, f64), LedgerError> {
        let previous = self.ledger.balance();
        crate::ledger::operation::ensure_finite(self.ledger.operations().total())?;
        let current = self.ledger.recompute_balance();
        if previous != current {
            info!(previous, current, "balance reconciled");
        }
        self.persist()?;
        Ok((previous, current))
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    pub fn query(&self, filter: &OperationFilter) -> OperationTree {
        OperationService::query(&self.ledger, filter)
    }

    pub fn entries(&self, filter: &OperationFilter) -> Vec<OperationEntry> {
        OperationService::entries(&self.ledger, filter)
    }

    pub fn find(&self, id: Uuid) -> Option<OperationEntry> {
        self.ledger.find(id)
    }

    pub fn resolve_id(&self, reference: &str) -> Result<Uuid, LedgerError> {
        OperationService::resolve_id(&self.ledger, reference)
    }

    pub fn list_years(&self) -> Vec<String> {
        SummaryService::list_years(&self.ledger, self.today())
    }

    pub fn list_categories(&self) -> Vec<String> {
        CategoryService::list(&self.ledger)
    }

    pub fn monthly_daily_totals(
        &self,
        year: &str,
        month: &str,
    ) -> Result<BTreeMap<String, f64>, LedgerError> {
        SummaryService::monthly_daily_totals(&self.ledger, year, month)
    }

    pub fn current_month_split(&self) -> SpendEarnSplit {
        SummaryService::current_month_split(&self.ledger, self.today())
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        self.dirty = true;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::clock::FixedClock;
    use crate::storage::MemoryStorage;

    fn open_with(storage: Arc<MemoryStorage>) -> (LedgerManager, LoadMetadata) {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
        LedgerManager::open(Box::new(storage), Box::new(clock)).expect("open manager")
    }

    fn date(raw: &str) -> DatePath {
        raw.parse().unwrap()
    }

    #[test]
    fn fresh_store_is_written_on_open() {
        let storage = Arc::new(MemoryStorage::new());
        let (manager, meta) = open_with(storage.clone());
        assert_eq!(meta.origin, LoadOrigin::Fresh);
        assert_eq!(storage.save_count(), 1);
        assert!(!manager.has_unsaved_changes());
    }

    #[test]
    fn every_mutation_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut manager, _) = open_with(storage.clone());
        let id = manager.add_operation(&date("2024-05-01"), -9.5, "taxes").unwrap();
        manager.add_category("rent").unwrap();
        manager.update_operation_by_id(id, -10.0, "rent").unwrap();
        assert_eq!(storage.save_count(), 4);

        let stored = storage.document().unwrap();
        assert!(stored.contains("\"rent\""));
        assert!(stored.contains("\"balance\": -10.0"));
    }

    #[test]
    fn rejected_mutation_does_not_save() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut manager, _) = open_with(storage.clone());
        let err = manager
            .add_operation(&date("2024-05-01"), 1.0, "unregistered")
            .expect_err("unknown category");
        assert!(matches!(err, LedgerError::UnknownCategory(_)));
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn failed_save_keeps_changes_until_retry() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut manager, _) = open_with(storage.clone());
        storage.set_fail_saves(true);

        let err = manager
            .add_operation(&date("2024-05-02"), 40.0, "shopping")
            .expect_err("save disabled");
        assert!(matches!(err, LedgerError::SaveFailed { .. }));
        assert!(manager.has_unsaved_changes());
        assert_eq!(manager.balance(), 40.0);

        storage.set_fail_saves(false);
        manager.save().unwrap();
        assert!(!manager.has_unsaved_changes());
        assert!(storage.document().unwrap().contains("\"balance\": 40.0"));
    }

    #[test]
    fn reconcile_removes_drift() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut manager, _) = open_with(storage);
        manager.add_operation(&date("2024-05-03"), 5.0, "shopping").unwrap();
        manager.set_balance(100.0).unwrap();
        assert_eq!(manager.reconcile_balance().unwrap(), (100.0, 5.0));
        assert_eq!(manager.ledger().balance_drift(), 0.0);
    }

    #[test]
    fn summaries_use_the_clock() {
        let storage = Arc::new(MemoryStorage::new());
        let (mut manager, _) = open_with(storage);
        assert_eq!(manager.list_years(), vec!["2024"]);
        manager.add_operation(&date("2024-05-04"), -3.0, "shopping").unwrap();
        manager.add_operation(&date("2024-05-04"), 1.0, "shopping").unwrap();
        let split = manager.current_month_split();
        assert_eq!(split.spending, 3.0);
        assert_eq!(split.earning, 1.0);
    }
}
