//! Business logic helpers for managing dated operations.

use uuid::Uuid;

use crate::errors::LedgerError;
use crate::ledger::{
    operation::ensure_finite, DatePath, Ledger, Operation, OperationEntry, OperationFilter,
    OperationTree,
};

use super::ServiceResult;

/// Provides validated add/update/remove/query helpers for ledger operations.
pub struct OperationService;

impl OperationService {
    /// Appends a new operation on `date` and returns its identifier.
    pub fn add(
        ledger: &mut Ledger,
        date: &DatePath,
        value: f64,
        category: &str,
    ) -> ServiceResult<Uuid> {
        ensure_finite(value)?;
        let category = Self::validate_category(ledger, category, None)?;
        ensure_balance_finite(ledger.balance() + value)?;
        Ok(ledger.insert_operation(date, Operation::new(value, category)))
    }

    /// Replaces the operation at `index` on `date`, returning its previous state.
    pub fn update(
        ledger: &mut Ledger,
        date: &DatePath,
        index: usize,
        value: f64,
        category: &str,
    ) -> ServiceResult<Operation> {
        ensure_finite(value)?;
        let current = operation_at(ledger, date, index)?;
        let (current_value, current_category) = (current.value, current.category.clone());
        let category = Self::validate_category(ledger, category, Some(&current_category))?;
        ensure_balance_finite(ledger.balance() - current_value + value)?;
        ledger.replace_operation(date, index, value, category)
    }

    pub fn update_by_id(
        ledger: &mut Ledger,
        id: Uuid,
        value: f64,
        category: &str,
    ) -> ServiceResult<OperationEntry> {
        let (date, index) = ledger.locate(id)?;
        let previous = Self::update(ledger, &date, index, value, category)?;
        Ok(OperationEntry {
            date,
            index,
            operation: previous,
        })
    }

    /// Removes the operation at `index` on `date`, pruning emptied dates.
    pub fn remove(ledger: &mut Ledger, date: &DatePath, index: usize) -> ServiceResult<Operation> {
        let value = operation_at(ledger, date, index)?.value;
        ensure_balance_finite(ledger.balance() - value)?;
        ledger.remove_operation(date, index)
    }

    pub fn remove_by_id(ledger: &mut Ledger, id: Uuid) -> ServiceResult<OperationEntry> {
        let (date, index) = ledger.locate(id)?;
        let operation = Self::remove(ledger, &date, index)?;
        Ok(OperationEntry {
            date,
            index,
            operation,
        })
    }

    pub fn query(ledger: &Ledger, filter: &OperationFilter) -> OperationTree {
        ledger.query(filter)
    }

    pub fn entries(ledger: &Ledger, filter: &OperationFilter) -> Vec<OperationEntry> {
        ledger.entries(filter)
    }

    /// Resolves a full id or an unambiguous id prefix to an operation.
    pub fn resolve_id(ledger: &Ledger, reference: &str) -> ServiceResult<Uuid> {
        if let Ok(id) = Uuid::parse_str(reference) {
            return Ok(id);
        }
        let needle = reference.trim().to_ascii_lowercase().replace('-', "");
        if needle.is_empty() {
            return Err(LedgerError::malformed("operation id cannot be empty"));
        }
        let mut matches = ledger
            .operations()
            .operations()
            .filter(|op| op.id.simple().to_string().starts_with(&needle))
            .map(|op| op.id);
        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => Err(LedgerError::malformed(format!(
                "no operation matches id `{reference}`"
            ))),
            (Some(_), Some(_)) => Err(LedgerError::malformed(format!(
                "id `{reference}` is ambiguous; use more characters"
            ))),
        }
    }

    fn validate_category(
        ledger: &Ledger,
        candidate: &str,
        current: Option<&str>,
    ) -> ServiceResult<String> {
        let name = candidate.trim();
        if name.is_empty() {
            return Err(LedgerError::malformed("category cannot be empty"));
        }
        if ledger.categories().accepts(name) || current == Some(name) {
            Ok(name.to_string())
        } else {
            Err(LedgerError::UnknownCategory(name.to_string()))
        }
    }
}

fn operation_at<'a>(
    ledger: &'a Ledger,
    date: &DatePath,
    index: usize,
) -> ServiceResult<&'a Operation> {
    ledger
        .operations()
        .day(date)
        .and_then(|ops| ops.get(index))
        .ok_or_else(|| LedgerError::IndexOutOfRange {
            date: date.clone(),
            index,
        })
}

/// Rejects a change before it is applied when the resulting balance could
/// not be stored as a JSON number.
fn ensure_balance_finite(next: f64) -> ServiceResult<()> {
    if next.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::malformed(
            "amount would push the balance out of the representable range",
        ))
    }
}
