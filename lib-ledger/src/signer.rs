//! Ed25519 signing credentials and on-ledger address derivation.

use crate::error::{LedgerError, LedgerResult};
use crate::types::{address_from_bytes, Address};
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::{Signer as _, SigningKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scheme flag prepended to the public key before hashing into an address.
const ED25519_SCHEME_FLAG: u8 = 0x00;

/// An operator signing credential.
///
/// Wraps one ed25519 key and derives the on-ledger address from it. All
/// transaction authorization in this toolkit flows through a `Signer`; the
/// derived address is what precondition checks compare against remote
/// authority fields.
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Generate a fresh credential from OS entropy.
    pub fn generate() -> Self {
        Signer {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Parse key material supplied by the operator. Accepts 32-byte hex
    /// (with or without a 0x prefix) or standard base64.
    pub fn parse(material: &str) -> LedgerResult<Self> {
        let trimmed = material.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = if stripped.len() == 64 && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
            hex::decode(stripped)
                .map_err(|e| LedgerError::KeyMaterial(format!("invalid hex: {}", e)))?
        } else {
            general_purpose::STANDARD
                .decode(trimmed)
                .map_err(|e| LedgerError::KeyMaterial(format!("invalid base64: {}", e)))?
        };
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> LedgerResult<Self> {
        let seed: [u8; 32] = bytes.try_into().map_err(|_| {
            LedgerError::KeyMaterial(format!("expected 32 key bytes, got {}", bytes.len()))
        })?;
        Ok(Signer {
            key: SigningKey::from_bytes(&seed),
        })
    }

    /// The on-ledger address: hash of the scheme flag plus public key bytes.
    pub fn address(&self) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[ED25519_SCHEME_FLAG]);
        hasher.update(self.key.verifying_key().as_bytes());
        let digest: [u8; 32] = hasher.finalize().into();
        address_from_bytes(&digest)
    }

    pub fn public_key_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.key.verifying_key().as_bytes())
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }

    /// Sign canonical transaction bytes, returning the base64 signature the
    /// submission endpoint expects.
    pub fn sign_base64(&self, bytes: &[u8]) -> String {
        let signature = self.key.sign(bytes);
        general_purpose::STANDARD.encode(signature.to_bytes())
    }
}

/// Serialized keystore layout for `generate-keypair`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreFile {
    pub address: Address,
    pub public_key: String,
    pub private_key: String,
}

impl KeystoreFile {
    pub fn from_signer(signer: &Signer) -> Self {
        KeystoreFile {
            address: signer.address(),
            public_key: signer.public_key_base64(),
            private_key: signer.private_key_hex(),
        }
    }

    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn load(path: &Path) -> LedgerResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_HEX: &str = "9bfd2c724bea6e15f5d4f2431a3b6f1b24f4a052ab20b7bfb4b4eb2a6f3bba11";

    #[test]
    fn test_parse_hex_with_and_without_prefix() {
        let a = Signer::parse(SEED_HEX).unwrap();
        let b = Signer::parse(&format!("0x{}", SEED_HEX)).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_parse_base64() {
        let bytes = hex::decode(SEED_HEX).unwrap();
        let b64 = general_purpose::STANDARD.encode(&bytes);
        let a = Signer::parse(&b64).unwrap();
        let b = Signer::parse(SEED_HEX).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(Signer::parse("0xabcd").is_err());
        assert!(Signer::parse("not key material at all!").is_err());
    }

    #[test]
    fn test_address_is_deterministic() {
        let a = Signer::parse(SEED_HEX).unwrap();
        let b = Signer::parse(SEED_HEX).unwrap();
        assert_eq!(a.address(), b.address());
        // Address must be a valid 0x-prefixed 32-byte identifier.
        assert!(a.address().as_str().parse::<Address>().is_ok());
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        let a = Signer::generate();
        let b = Signer::generate();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_private_key_hex_round_trip() {
        let a = Signer::generate();
        let b = Signer::parse(&a.private_key_hex()).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_keystore_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.json");
        let signer = Signer::generate();
        let keystore = KeystoreFile::from_signer(&signer);
        keystore.save(&path).unwrap();
        let loaded = KeystoreFile::load(&path).unwrap();
        assert_eq!(loaded.address, signer.address());
        let restored = Signer::parse(&loaded.private_key).unwrap();
        assert_eq!(restored.address(), signer.address());
    }
}
