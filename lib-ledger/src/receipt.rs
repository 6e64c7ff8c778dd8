//! Transaction receipt types and deployment-receipt scanning.

use crate::error::{LedgerError, LedgerResult};
use crate::type_tag::TypeTag;
use crate::types::{Address, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full receipt of one submitted (or dry-run) transaction: effects, object
/// changes, events, and balance changes. Persisted verbatim to the JSON log
/// after every successful mutating run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub digest: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub balance_changes: Vec<BalanceChange>,
}

impl TransactionReceipt {
    /// Convert a failed execution status into a remote-rejection error,
    /// passing successful receipts through unchanged.
    pub fn ensure_success(self) -> LedgerResult<Self> {
        match &self.status {
            ExecutionStatus::Success => Ok(self),
            ExecutionStatus::Failure { error } => Err(LedgerError::RemoteRejection {
                digest: self.digest.clone(),
                reason: error.clone(),
            }),
        }
    }

    /// Scan the object changes for exactly one created object whose type
    /// matches `module::name` (any package). Zero or multiple matches is a
    /// count-mismatch error; an unparseable created type is skipped.
    pub fn single_created_object(
        &self,
        module: &str,
        name: &str,
    ) -> LedgerResult<(ObjectId, TypeTag)> {
        let mut matches = Vec::new();
        for change in &self.object_changes {
            if let ObjectChange::Created {
                object_id,
                object_type,
                ..
            } = change
            {
                if let Ok(tag) = TypeTag::parse(object_type) {
                    if tag.matches_entry(module, name) {
                        matches.push((object_id.clone(), tag));
                    }
                }
            }
        }
        if matches.len() != 1 {
            return Err(LedgerError::CreatedObjectCount {
                pattern: format!("{}::{}", module, name),
                count: matches.len(),
            });
        }
        Ok(matches.remove(0))
    }
}

/// Remote execution outcome. Failure carries the contract-level error string
/// verbatim (e.g. "address denied", "globally paused").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// One object touched by the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectChange {
    Created {
        object_id: ObjectId,
        object_type: String,
        owner: ObjectOwner,
    },
    Mutated {
        object_id: ObjectId,
        object_type: String,
    },
    Deleted {
        object_id: ObjectId,
        object_type: String,
    },
}

/// Ownership of a remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectOwner {
    Address { address: Address },
    Object { object_id: ObjectId },
    Shared,
    Immutable,
}

/// One contract-emitted event: the printed event type plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_type: String,
    pub data: Value,
}

/// Net balance movement for one owner in one coin type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceChange {
    pub owner: Address,
    pub coin_type: String,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: char) -> String {
        format!("0x{}{}", "0".repeat(63), last)
    }

    fn created(object_type: &str, id_suffix: char) -> ObjectChange {
        ObjectChange::Created {
            object_id: addr(id_suffix).parse().unwrap(),
            object_type: object_type.to_string(),
            owner: ObjectOwner::Shared,
        }
    }

    fn receipt_with(changes: Vec<ObjectChange>) -> TransactionReceipt {
        TransactionReceipt {
            digest: "D1".to_string(),
            status: ExecutionStatus::Success,
            object_changes: changes,
            events: Vec::new(),
            balance_changes: Vec::new(),
        }
    }

    #[test]
    fn test_ensure_success_passes_success_through() {
        let receipt = receipt_with(Vec::new());
        assert!(receipt.ensure_success().is_ok());
    }

    #[test]
    fn test_ensure_success_rejects_failure() {
        let receipt = TransactionReceipt {
            status: ExecutionStatus::Failure {
                error: "globally paused".to_string(),
            },
            ..receipt_with(Vec::new())
        };
        let err = receipt.ensure_success().unwrap_err();
        assert!(err.to_string().contains("globally paused"));
    }

    #[test]
    fn test_single_created_object_found() {
        let receipt = receipt_with(vec![
            created("0xa::treasury::Treasury<0xb::usdx::USDX>", '1'),
            created("0xa::mint_cap::MintCap<0xb::usdx::USDX>", '2'),
        ]);
        let (id, tag) = receipt.single_created_object("treasury", "Treasury").unwrap();
        assert_eq!(id.as_str(), addr('1'));
        assert_eq!(tag.package, "0xa");
    }

    #[test]
    fn test_single_created_object_zero_matches() {
        let receipt = receipt_with(vec![created("0xa::coin::Coin", '1')]);
        let err = receipt
            .single_created_object("treasury", "Treasury")
            .unwrap_err();
        assert!(err.to_string().contains("found 0"));
    }

    #[test]
    fn test_single_created_object_multiple_matches() {
        let receipt = receipt_with(vec![
            created("0xa::treasury::Treasury<0xb::usdx::USDX>", '1'),
            created("0xc::treasury::Treasury<0xb::usdx::USDX>", '2'),
        ]);
        let err = receipt
            .single_created_object("treasury", "Treasury")
            .unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_receipt_round_trips_through_json() {
        let receipt = receipt_with(vec![created("0xa::treasury::Treasury", '1')]);
        let json = serde_json::to_string(&receipt).unwrap();
        let back: TransactionReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }
}
