use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

use super::{
    balance::Balance,
    category::CategoryRegistry,
    date::DatePath,
    filter::OperationFilter,
    operation::{Operation, OperationEntry},
    tree::OperationTree,
};

pub const OPERATIONS_KEY: &str = "Operations";
pub const CATEGORIES_KEY: &str = "Categories";
pub const BALANCE_KEY: &str = "balance";
pub const DOCUMENT_KEYS: [&str; 3] = [OPERATIONS_KEY, CATEGORIES_KEY, BALANCE_KEY];

/// The persisted document: dated operations, category labels and the
/// running balance.
///
/// Every mutation of the tree goes through a method that applies the
/// matching balance delta, so `balance == sum(values)` holds unless the
/// balance is overridden with [`Ledger::set_balance`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(rename = "Operations", default)]
    operations: OperationTree,
    #[serde(rename = "Categories", default)]
    categories: CategoryRegistry,
    #[serde(default)]
    balance: Balance,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: CategoryRegistry) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    pub fn operations(&self) -> &OperationTree {
        &self.operations
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn balance(&self) -> f64 {
        self.balance.value()
    }

    pub fn set_balance(&mut self, value: f64) {
        self.balance = Balance::new(value);
    }

    /// Re-sums the whole tree and stores the result as the balance.
    pub fn recompute_balance(&mut self) -> f64 {
        let total = self.operations.total();
        self.balance = Balance::new(total);
        total
    }

    pub fn balance_drift(&self) -> f64 {
        self.balance
            .drift_from(self.operations.total(), self.operations.volume())
    }

    pub fn insert_operation(&mut self, date: &DatePath, operation: Operation) -> Uuid {
        let id = operation.id;
        self.balance.credit(operation.value);
        self.operations.push(date, operation);
        id
    }

    /// Replaces value and category in place, returning the previous state.
    pub fn replace_operation(
        &mut self,
        date: &DatePath,
        index: usize,
        value: f64,
        category: String,
    ) -> Result<Operation> {
        let operation = self
            .operations
            .get_mut(date, index)
            .ok_or_else(|| out_of_range(date, index))?;
        let previous = operation.clone();
        operation.value = value;
        operation.category = category;
        self.balance.replace(previous.value, value);
        Ok(previous)
    }

    pub fn remove_operation(&mut self, date: &DatePath, index: usize) -> Result<Operation> {
        let removed = self
            .operations
            .remove(date, index)
            .ok_or_else(|| out_of_range(date, index))?;
        self.balance.debit(removed.value);
        Ok(removed)
    }

    pub fn locate(&self, id: Uuid) -> Result<(DatePath, usize)> {
        self.operations
            .locate(id)
            .ok_or(LedgerError::OperationNotFound(id))
    }

    pub fn find(&self, id: Uuid) -> Option<OperationEntry> {
        let (date, index) = self.operations.locate(id)?;
        let operation = self.operations.day(&date)?.get(index)?.clone();
        Some(OperationEntry {
            date,
            index,
            operation,
        })
    }

    pub fn query(&self, filter: &OperationFilter) -> OperationTree {
        if filter.is_unrestricted() {
            return self.operations.clone();
        }
        self.operations.filtered(filter)
    }

    /// Flattened `(date, index, operation)` rows for the days matching
    /// `filter`, in chronological order.
    pub fn entries(&self, filter: &OperationFilter) -> Vec<OperationEntry> {
        self.operations
            .days()
            .filter(|(date, _)| filter.matches(date))
            .flat_map(|(date, ops)| {
                ops.iter()
                    .enumerate()
                    .map(move |(index, operation)| OperationEntry {
                        date: date.clone(),
                        index,
                        operation: operation.clone(),
                    })
            })
            .collect()
    }

    pub fn add_category(&mut self, name: String) -> bool {
        self.categories.insert(name)
    }

    pub(crate) fn dedup_categories(&mut self) -> usize {
        self.categories.dedup()
    }

    pub fn normalize(&mut self) -> Result<usize> {
        self.operations.normalize()
    }
}

fn out_of_range(date: &DatePath, index: usize) -> LedgerError {
    LedgerError::IndexOutOfRange {
        date: date.clone(),
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> DatePath {
        raw.parse().unwrap()
    }

    #[test]
    fn new_ledger_serializes_three_keys() {
        let value = serde_json::to_value(Ledger::new()).unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        for key in DOCUMENT_KEYS {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object[BALANCE_KEY], serde_json::json!(0.0));
    }

    #[test]
    fn balance_tracks_every_mutation() {
        let mut ledger = Ledger::new();
        let day = date("2024-05-01");
        ledger.insert_operation(&day, Operation::new(-50.0, "groceries"));
        ledger.insert_operation(&day, Operation::new(200.0, "taxes"));
        assert_eq!(ledger.balance(), 150.0);

        let previous = ledger
            .replace_operation(&day, 0, -20.0, "shopping".into())
            .unwrap();
        assert_eq!(previous.value, -50.0);
        assert_eq!(ledger.balance(), 180.0);

        ledger.remove_operation(&day, 1).unwrap();
        assert_eq!(ledger.balance(), -20.0);
        assert_eq!(ledger.balance_drift(), 0.0);
    }

    #[test]
    fn out_of_range_edits_leave_state_untouched() {
        let mut ledger = Ledger::new();
        let day = date("2024-05-01");
        ledger.insert_operation(&day, Operation::new(10.0, "taxes"));

        let err = ledger
            .replace_operation(&day, 3, 1.0, "taxes".into())
            .expect_err("index 3 does not exist");
        assert!(matches!(err, LedgerError::IndexOutOfRange { index: 3, .. }));

        let err = ledger
            .remove_operation(&date("2024-05-02"), 0)
            .expect_err("no such day");
        assert!(matches!(err, LedgerError::IndexOutOfRange { .. }));
        assert_eq!(ledger.balance(), 10.0);
    }

    #[test]
    fn set_balance_drifts_until_recomputed() {
        let mut ledger = Ledger::new();
        ledger.insert_operation(&date("2024-01-01"), Operation::new(5.0, "taxes"));
        ledger.set_balance(100.0);
        assert_eq!(ledger.balance_drift(), 95.0);
        assert_eq!(ledger.recompute_balance(), 5.0);
        assert_eq!(ledger.balance_drift(), 0.0);
    }

    #[test]
    fn summation_order_is_not_reported_as_drift() {
        let mut ledger = Ledger::new();
        ledger.insert_operation(&date("2024-01-03"), Operation::new(0.1, "taxes"));
        ledger.insert_operation(&date("2024-01-01"), Operation::new(1e15, "taxes"));
        ledger.insert_operation(&date("2024-01-02"), Operation::new(-1e15, "taxes"));

        assert_ne!(ledger.balance(), ledger.operations().total());
        assert_eq!(ledger.balance_drift(), 0.0);
    }

    #[test]
    fn entries_are_flattened_with_indices() {
        let mut ledger = Ledger::new();
        ledger.insert_operation(&date("2024-02-01"), Operation::new(1.0, "taxes"));
        ledger.insert_operation(&date("2024-01-15"), Operation::new(2.0, "taxes"));
        ledger.insert_operation(&date("2024-01-15"), Operation::new(3.0, "taxes"));

        let rows = ledger.entries(&OperationFilter::all());
        let summary: Vec<(String, usize, f64)> = rows
            .iter()
            .map(|row| (row.date.to_string(), row.index, row.operation.value))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024-01-15".to_string(), 0, 2.0),
                ("2024-01-15".to_string(), 1, 3.0),
                ("2024-02-01".to_string(), 0, 1.0),
            ]
        );
    }

    #[test]
    fn find_returns_current_position() {
        let mut ledger = Ledger::new();
        let day = date("2024-03-03");
        ledger.insert_operation(&day, Operation::new(1.0, "taxes"));
        let id = ledger.insert_operation(&day, Operation::new(2.0, "taxes"));
        ledger.remove_operation(&day, 0).unwrap();

        let entry = ledger.find(id).unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(entry.operation.value, 2.0);
        assert!(matches!(
            ledger.locate(Uuid::new_v4()),
            Err(LedgerError::OperationNotFound(_))
        ));
    }
}
