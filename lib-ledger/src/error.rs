//! Structured error types for ledger client operations
//!
//! Covers the four failure families every command must distinguish:
//! client-side precondition violations, remote rejections, object shape
//! errors, and validation mismatches.

use thiserror::Error;

/// Ledger client error types with proper context
#[derive(Error, Debug)]
pub enum LedgerError {
    // Client-side precondition violations, raised before any network mutation
    #[error("Precondition failed: {0}")]
    Precondition(String),

    // The ledger accepted the submission but reported execution failure
    #[error("Transaction {digest} rejected by the ledger: {reason}")]
    RemoteRejection { digest: String, reason: String },

    // Transport-level or protocol-level RPC failure
    #[error("RPC call '{method}' failed: {reason}")]
    RpcFailed { method: String, reason: String },

    // A remote object did not have the field layout this client expects
    #[error("Unexpected object shape at '{path}': expected {expected}")]
    Shape { path: String, expected: String },

    #[error("Expected exactly one created object matching '{pattern}', found {count}")]
    CreatedObjectCount { pattern: String, count: usize },

    #[error("Invalid type tag '{input}': {reason}")]
    TypeTag { input: String, reason: String },

    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("Invalid key material: {0}")]
    KeyMaterial(String),

    // Deep-equality failure between expected and observed state
    #[error("State mismatch at '{field}': expected {expected}, actual {actual}")]
    StateMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ledger client operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_rejection_message() {
        let err = LedgerError::RemoteRejection {
            digest: "A1B2".to_string(),
            reason: "address denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transaction A1B2 rejected by the ledger: address denied"
        );
    }

    #[test]
    fn test_state_mismatch_names_field() {
        let err = LedgerError::StateMismatch {
            field: "roles.owner.active".to_string(),
            expected: "0xaa".to_string(),
            actual: "0xbb".to_string(),
        };
        assert!(err.to_string().contains("roles.owner.active"));
        assert!(err.to_string().contains("0xaa"));
        assert!(err.to_string().contains("0xbb"));
    }
}
