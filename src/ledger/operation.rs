use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};

use super::date::DatePath;

/// A single income (positive) or spending (negative) entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operation {
    pub value: f64,
    pub category: String,
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
}

impl Operation {
    pub fn new(value: f64, category: impl Into<String>) -> Self {
        Self {
            value,
            category: category.into(),
            id: Uuid::new_v4(),
        }
    }

    pub fn is_spending(&self) -> bool {
        self.value < 0.0
    }
}

/// An operation together with the position it occupies in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationEntry {
    pub date: DatePath,
    pub index: usize,
    pub operation: Operation,
}

/// Parses a user-supplied amount, rejecting blanks, non-numeric text and
/// non-finite values.
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::malformed("No input"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| LedgerError::malformed(format!("`{trimmed}` is not numeric")))?;
    ensure_finite(value)?;
    Ok(value)
}

pub(crate) fn ensure_finite(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::malformed(format!(
            "amount must be a finite number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_accepts_signed_decimals() {
        assert_eq!(parse_amount(" -12.5 ").unwrap(), -12.5);
        assert_eq!(parse_amount("40").unwrap(), 40.0);
    }

    #[test]
    fn parse_amount_reports_blank_and_text() {
        let blank = parse_amount("   ").expect_err("blank input");
        assert_eq!(blank.to_string(), "Invalid input: No input");

        let text = parse_amount("ten").expect_err("non numeric");
        assert!(text.to_string().contains("not numeric"));

        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn legacy_operations_without_id_get_one() {
        let op: Operation = serde_json::from_str(r#"{"value": -3, "category": "taxes"}"#).unwrap();
        assert_eq!(op.value, -3.0);
        assert!(op.is_spending());
        assert!(!op.id.is_nil());
    }
}
