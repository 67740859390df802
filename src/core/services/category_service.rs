use crate::errors::LedgerError;
use crate::ledger::Ledger;

use super::ServiceResult;

pub struct CategoryService;

impl CategoryService {
    /// Registers a new label. Names are trimmed; matching is case-sensitive.
    pub fn add(ledger: &mut Ledger, name: &str) -> ServiceResult<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::malformed("category name cannot be empty"));
        }
        if !ledger.add_category(name.to_string()) {
            return Err(LedgerError::DuplicateCategory(name.to_string()));
        }
        Ok(name.to_string())
    }

    pub fn list(ledger: &Ledger) -> Vec<String> {
        ledger.categories().sorted()
    }
}
