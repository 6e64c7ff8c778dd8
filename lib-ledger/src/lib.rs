//! Remote ledger client wrappers for stablecoin treasury operations.
//!
//! This crate is the library half of the treasury operations toolkit. It
//! knows the fixed set of remote contract entry points for two contract
//! families (the token treasury and the upgrade-authorization service) and
//! exposes typed wrappers that build call payloads, submit them, and decode
//! the resulting object state.
//!
//! ## Architecture
//!
//! - **Transport** (`rpc` module): thin JSON-RPC client over HTTP
//! - **Decoding** (`decode`, `type_tag` modules): all knowledge of the remote
//!   object field layout, isolated behind pure functions
//! - **Wrappers** (`treasury`, `upgrade_service` modules): typed operations
//!   against one remote record
//! - **Validation** (`validator`, `reconcile` modules): expected-vs-observed
//!   state reconstruction and the shared three-state reconciliation check
//! - **Credentials** (`signer` module): ed25519 signing keys and address
//!   derivation

pub mod decode;
pub mod error;
pub mod receipt;
pub mod reconcile;
pub mod rpc;
pub mod signer;
pub mod treasury;
pub mod type_tag;
pub mod types;
pub mod upgrade_service;
pub mod validator;

pub use error::{LedgerError, LedgerResult};
pub use receipt::{ExecutionStatus, ObjectChange, TransactionReceipt};
pub use reconcile::Reconciliation;
pub use rpc::LedgerRpc;
pub use signer::Signer;
pub use treasury::TreasuryClient;
pub use type_tag::TypeTag;
pub use types::{Address, EpochSelector, MigrationAction, ObjectId};
pub use upgrade_service::UpgradeServiceClient;
