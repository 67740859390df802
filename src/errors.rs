use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::DatePath;

/// Error type that captures ledger, validation, and persistence failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    MalformedInput(String),
    #[error("Category `{0}` already exists")]
    DuplicateCategory(String),
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),
    #[error("No operation #{index} on {date}; the entry may have changed, refresh and retry")]
    IndexOutOfRange { date: DatePath, index: usize },
    #[error("Operation {0} not found")]
    OperationNotFound(Uuid),
    #[error("Cannot read store `{}`: {reason}", path.display())]
    CorruptStore { path: PathBuf, reason: String },
    #[error("Failed to save store `{}`: {source}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        LedgerError::MalformedInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Failures that stop the command shell itself, as opposed to a single command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_date_and_index() {
        let date: DatePath = "2024-02-03".parse().unwrap();
        let err = LedgerError::IndexOutOfRange { date, index: 4 };
        assert_eq!(
            err.to_string(),
            "No operation #4 on 2024-02-03; the entry may have changed, refresh and retry"
        );
    }

    #[test]
    fn cli_error_wraps_core_errors_transparently() {
        let err: CliError = LedgerError::DuplicateCategory("rent".into()).into();
        assert_eq!(err.to_string(), "Category `rent` already exists");
    }
}
