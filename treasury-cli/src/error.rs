//! Structured error types for the treasury CLI
//!
//! Wraps the ledger client's error taxonomy and adds the failure modes that
//! belong to the command layer: bad arguments, config problems, operator
//! aborts.

use thiserror::Error;

/// Treasury CLI error types with proper context
#[derive(Error, Debug)]
pub enum CliError {
    // Everything the ledger client can raise: preconditions, remote
    // rejections, shape errors, validation mismatches, transport failures
    #[error(transparent)]
    Ledger(#[from] lib_ledger::LedgerError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to load config from {path}: {reason}")]
    ConfigLoadFailed { path: String, reason: String },

    #[error("Key error: {0}")]
    KeyError(String),

    // Operator answered no at the confirmation prompt
    #[error("Aborted by operator; nothing was submitted")]
    Aborted,

    #[error("Receipt log error: {0}")]
    ReceiptLog(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for CliError {
    fn from(s: String) -> Self {
        CliError::Other(s)
    }
}

impl From<&str> for CliError {
    fn from(s: &str) -> Self {
        CliError::Other(s.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_passes_through_message() {
        let err: CliError = lib_ledger::LedgerError::Precondition(
            "signer is not the master minter".to_string(),
        )
        .into();
        assert_eq!(
            err.to_string(),
            "Precondition failed: signer is not the master minter"
        );
    }

    #[test]
    fn test_aborted_message() {
        assert!(CliError::Aborted.to_string().contains("nothing was submitted"));
    }
}
