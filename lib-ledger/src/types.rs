//! Core identifier and record types shared across the ledger client.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// On-ledger account address: 32 bytes, printed as 0x-prefixed lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex_id(s).map(Address).map_err(|reason| {
            LedgerError::InvalidAddress {
                input: s.to_string(),
                reason,
            }
        })
    }
}

/// On-ledger object identifier. Same wire format as an address, but the two
/// name different things and must not be interchanged in call arguments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ObjectId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_hex_id(s).map(ObjectId).map_err(|reason| {
            LedgerError::InvalidAddress {
                input: s.to_string(),
                reason,
            }
        })
    }
}

// Identifiers serialize as their printed form and validate on the way in,
// including when used as JSON map keys in expected-state documents.
macro_rules! impl_id_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_id_serde!(Address);
impl_id_serde!(ObjectId);

/// Normalize a 32-byte hex identifier: require the 0x prefix, exactly 64 hex
/// digits, and fold to lowercase so identifiers compare textually.
fn normalize_hex_id(s: &str) -> Result<String, String> {
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| "missing 0x prefix".to_string())?;
    if body.len() != 64 {
        return Err(format!("expected 64 hex digits, got {}", body.len()));
    }
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("contains non-hex characters".to_string());
    }
    Ok(format!("0x{}", body.to_ascii_lowercase()))
}

/// Build an address from raw 32-byte material.
pub(crate) fn address_from_bytes(bytes: &[u8; 32]) -> Address {
    Address(format!("0x{}", hex::encode(bytes)))
}

/// A privileged role slot on a remote record: the active holder plus an
/// optional pending holder awaiting the accept half of a two-phase transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub active: Address,
    pub pending: Option<Address>,
}

/// The full privileged-role assignment of one treasury record.
///
/// Only ownership follows the two-phase propose/accept pattern; the
/// operational roles rotate in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryRoles {
    pub owner: Role,
    pub master_minter: Address,
    pub blocklister: Address,
    pub pauser: Address,
    pub metadata_updater: Address,
}

/// Coin metadata carried by the treasury record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub icon_url: String,
    pub decimals: u8,
}

/// Which epoch view of a dual-valued flag to read.
///
/// Pause and blocklist writes land in the `next` value immediately and only
/// become `current` after the remote system's epoch boundary passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochSelector {
    Current,
    Next,
}

impl EpochSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpochSelector::Current => "current",
            EpochSelector::Next => "next",
        }
    }
}

/// Migration state-machine actions. Transitions are enforced remotely; the
/// client only issues the action and re-reads the compatible-version list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    Start,
    Abort,
    Complete,
}

impl MigrationAction {
    /// Remote entry-point name for this action.
    pub fn entry_point(&self) -> &'static str {
        match self {
            MigrationAction::Start => "start_migration",
            MigrationAction::Abort => "abort_migration",
            MigrationAction::Complete => "complete_migration",
        }
    }
}

impl FromStr for MigrationAction {
    type Err = LedgerError;

    fn from_str(s: &str) -> LedgerResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(MigrationAction::Start),
            "abort" => Ok(MigrationAction::Abort),
            "complete" => Ok(MigrationAction::Complete),
            other => Err(LedgerError::Precondition(format!(
                "Unknown migration action '{}'. Supported: start, abort, complete",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x72a19c2db5a98e0d83e0bd6c41d1ac30c8ac3b558bc54582538bfdf78dde7d1c";

    #[test]
    fn test_address_parse_valid() {
        let addr: Address = ADDR.parse().unwrap();
        assert_eq!(addr.as_str(), ADDR);
    }

    #[test]
    fn test_address_parse_uppercase_normalized() {
        let upper = format!("0x{}", ADDR[2..].to_ascii_uppercase());
        let addr: Address = upper.parse().unwrap();
        assert_eq!(addr.as_str(), ADDR);
    }

    #[test]
    fn test_address_parse_missing_prefix() {
        assert!(ADDR[2..].parse::<Address>().is_err());
    }

    #[test]
    fn test_address_parse_wrong_length() {
        assert!("0xabcd".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_parse_non_hex() {
        let bad = format!("0x{}", "z".repeat(64));
        assert!(bad.parse::<Address>().is_err());
    }

    #[test]
    fn test_object_id_parse() {
        let id: ObjectId = ADDR.parse().unwrap();
        assert_eq!(id.as_str(), ADDR);
    }

    #[test]
    fn test_address_serde_validates() {
        let addr: Address = serde_json::from_str(&format!("\"{}\"", ADDR)).unwrap();
        assert_eq!(addr.as_str(), ADDR);
        assert_eq!(serde_json::to_string(&addr).unwrap(), format!("\"{}\"", ADDR));
        // Malformed identifiers are rejected at deserialization time.
        assert!(serde_json::from_str::<Address>("\"0xabc\"").is_err());
    }

    #[test]
    fn test_address_works_as_map_key() {
        use std::collections::BTreeMap;
        let raw = format!("{{\"{}\": 7}}", ADDR);
        let map: BTreeMap<Address, u64> = serde_json::from_str(&raw).unwrap();
        assert_eq!(map.len(), 1);
        assert!(serde_json::from_str::<BTreeMap<Address, u64>>("{\"bad\": 1}").is_err());
    }

    #[test]
    fn test_migration_action_parse() {
        assert_eq!(
            "start".parse::<MigrationAction>().unwrap(),
            MigrationAction::Start
        );
        assert_eq!(
            "COMPLETE".parse::<MigrationAction>().unwrap(),
            MigrationAction::Complete
        );
        assert!("pause".parse::<MigrationAction>().is_err());
    }

    #[test]
    fn test_migration_entry_points() {
        assert_eq!(MigrationAction::Start.entry_point(), "start_migration");
        assert_eq!(MigrationAction::Abort.entry_point(), "abort_migration");
        assert_eq!(
            MigrationAction::Complete.entry_point(),
            "complete_migration"
        );
    }
}
