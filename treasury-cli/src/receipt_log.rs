//! Receipt persistence.
//!
//! Every successful mutating run writes the full transaction receipt to a
//! timestamped JSON file under the logs directory, named
//! `<operation>-<timestamp>.json`.

use crate::error::{CliError, CliResult};
use chrono::Utc;
use lib_ledger::TransactionReceipt;
use std::fs;
use std::path::{Path, PathBuf};

/// Write one receipt, returning the path written.
pub fn write_receipt(
    logs_dir: &Path,
    operation: &str,
    receipt: &TransactionReceipt,
) -> CliResult<PathBuf> {
    fs::create_dir_all(logs_dir).map_err(|e| {
        CliError::ReceiptLog(format!(
            "Failed to create logs directory {}: {}",
            logs_dir.display(),
            e
        ))
    })?;

    let timestamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let path = logs_dir.join(format!("{}-{}.json", operation, timestamp));
    let data = serde_json::to_string_pretty(receipt)?;
    fs::write(&path, data).map_err(|e| {
        CliError::ReceiptLog(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_ledger::{ExecutionStatus, TransactionReceipt};

    fn sample_receipt() -> TransactionReceipt {
        TransactionReceipt {
            digest: "DIGEST1".to_string(),
            status: ExecutionStatus::Success,
            object_changes: Vec::new(),
            events: Vec::new(),
            balance_changes: Vec::new(),
        }
    }

    #[test]
    fn test_write_receipt_creates_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_receipt(dir.path(), "configure-minter", &sample_receipt()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("configure-minter-"));
        assert!(name.ends_with(".json"));

        let raw = fs::read_to_string(&path).unwrap();
        let back: TransactionReceipt = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.digest, "DIGEST1");
    }

    #[test]
    fn test_write_receipt_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let path = write_receipt(&nested, "mint", &sample_receipt()).unwrap();
        assert!(path.exists());
    }
}
