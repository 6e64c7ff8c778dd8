//! Client-side precondition checks.
//!
//! Every role-gated command re-reads current remote state and compares the
//! signing key's derived address against the expected authority before
//! anything is submitted. A mismatch aborts with no network mutation.

use crate::error::{CliError, CliResult};
use lib_ledger::types::Role;
use lib_ledger::Address;

/// The signer must be the active holder of the named role.
pub fn require_authority(
    signer_address: &Address,
    expected: &Address,
    role_name: &str,
) -> CliResult<()> {
    if signer_address == expected {
        Ok(())
    } else {
        Err(CliError::Ledger(lib_ledger::LedgerError::Precondition(
            format!(
                "Signer {} is not the current {} ({})",
                signer_address, role_name, expected
            ),
        )))
    }
}

/// The signer must be the pending holder of a two-phase role.
pub fn require_pending_authority(
    signer_address: &Address,
    role: &Role,
    role_name: &str,
) -> CliResult<()> {
    match &role.pending {
        None => Err(CliError::Ledger(lib_ledger::LedgerError::Precondition(
            format!("No pending {} transfer to accept", role_name),
        ))),
        Some(pending) if pending == signer_address => Ok(()),
        Some(pending) => Err(CliError::Ledger(lib_ledger::LedgerError::Precondition(
            format!(
                "Signer {} is not the pending {} ({})",
                signer_address, role_name, pending
            ),
        ))),
    }
}

/// A proposal that would create a second pending authority is rejected: a
/// different pending holder must be resolved (accepted or re-proposed by the
/// active holder deliberately) before this one goes out.
pub fn reject_duplicate_pending(
    role: &Role,
    proposed: &Address,
    role_name: &str,
) -> CliResult<()> {
    match &role.pending {
        Some(pending) if pending != proposed => {
            Err(CliError::Ledger(lib_ledger::LedgerError::Precondition(
                format!(
                    "A {} transfer to {} is already pending; refusing to propose {}",
                    role_name, pending, proposed
                ),
            )))
        }
        _ => Ok(()),
    }
}
