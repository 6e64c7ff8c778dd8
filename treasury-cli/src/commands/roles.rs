//! Privileged role commands
//!
//! - `rotate-privileged-roles`: rotate the operational roles and/or propose
//!   a new owner, as one atomic transaction of only the changes that differ
//! - `accept-treasury-owner`: the accept half of the two-phase ownership
//!   transfer, signed by the pending owner's key

use crate::argument_parsing::{AcceptTreasuryOwnerArgs, CliContext, RotatePrivilegedRolesArgs};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::logic::preconditions::{
    reject_duplicate_pending, require_authority, require_pending_authority,
};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::treasury::RoleRotation;
use lib_ledger::types::TreasuryRoles;
use lib_ledger::{LedgerError, TreasuryClient};

// ============================================================================
// PURE LOGIC - Rotation planning
// ============================================================================

/// Reduce a requested rotation to the changes that actually differ from the
/// live roles. Re-running with identical targets yields an empty plan.
pub fn plan_rotation(
    requested: &RotatePrivilegedRolesArgs,
    roles: &TreasuryRoles,
) -> RoleRotation {
    let differs = |new: &Option<lib_ledger::Address>, current: &lib_ledger::Address| {
        new.as_ref().filter(|addr| *addr != current).cloned()
    };
    RoleRotation {
        new_master_minter: differs(&requested.new_master_minter, &roles.master_minter),
        new_blocklister: differs(&requested.new_blocklister, &roles.blocklister),
        new_pauser: differs(&requested.new_pauser, &roles.pauser),
        new_metadata_updater: differs(&requested.new_metadata_updater, &roles.metadata_updater),
        new_owner: requested
            .new_owner
            .as_ref()
            .filter(|addr| {
                // Skip when already active or already pending.
                **addr != roles.owner.active && roles.owner.pending.as_ref() != Some(*addr)
            })
            .cloned(),
    }
}

/// One-line summary of the planned changes for the confirmation prompt.
pub fn describe_rotation_plan(plan: &RoleRotation) -> String {
    let mut parts = Vec::new();
    if let Some(addr) = &plan.new_master_minter {
        parts.push(format!("master minter -> {}", addr));
    }
    if let Some(addr) = &plan.new_blocklister {
        parts.push(format!("blocklister -> {}", addr));
    }
    if let Some(addr) = &plan.new_pauser {
        parts.push(format!("pauser -> {}", addr));
    }
    if let Some(addr) = &plan.new_metadata_updater {
        parts.push(format!("metadata updater -> {}", addr));
    }
    if let Some(addr) = &plan.new_owner {
        parts.push(format!("owner (proposal) -> {}", addr));
    }
    format!("Rotate privileged roles: {}", parts.join(", "))
}

// ============================================================================
// IMPERATIVE SHELL - Command handlers
// ============================================================================

pub async fn handle_rotate_privileged_roles_command(
    args: RotatePrivilegedRolesArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_rotate_privileged_roles_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_rotate_privileged_roles_with(
    args: RotatePrivilegedRolesArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.owner.active, "treasury owner")?;
    if let Some(new_owner) = &args.new_owner {
        reject_duplicate_pending(&roles.owner, new_owner, "owner")?;
    }

    let plan = plan_rotation(&args, &roles);
    if plan.is_empty() {
        output.info("All requested roles already match; nothing to submit")?;
        return Ok(());
    }

    confirm_or_abort(confirm, output, &describe_rotation_plan(&plan), ctx)?;
    let receipt = client
        .rotate_privileged_roles(&signer, &plan, &opts)
        .await?;
    log_and_report("rotate-privileged-roles", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let after = client.get_roles().await?;
        if let Some(proposed) = &plan.new_owner {
            // Two-phase: the proposal must be pending and the active owner
            // unchanged until the accept call.
            if after.owner.pending.as_ref() != Some(proposed) {
                return Err(CliError::Ledger(LedgerError::StateMismatch {
                    field: "roles.owner.pending".to_string(),
                    expected: proposed.to_string(),
                    actual: format!("{:?}", after.owner.pending),
                }));
            }
            if after.owner.active != roles.owner.active {
                return Err(CliError::Ledger(LedgerError::StateMismatch {
                    field: "roles.owner.active".to_string(),
                    expected: roles.owner.active.to_string(),
                    actual: after.owner.active.to_string(),
                }));
            }
            output.info(&format!(
                "Ownership transfer to {} is pending; run accept-treasury-owner with the new owner's key",
                proposed
            ))?;
        }
    }
    Ok(())
}

pub async fn handle_accept_treasury_owner_command(
    args: AcceptTreasuryOwnerArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_accept_treasury_owner_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_accept_treasury_owner_with(
    args: AcceptTreasuryOwnerArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_pending_authority(&signer.address(), &roles.owner, "owner")?;

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Accept treasury ownership: {} -> {}",
            roles.owner.active,
            signer.address()
        ),
        ctx,
    )?;
    let receipt = client.accept_treasury_owner(&signer, &opts).await?;
    log_and_report("accept-treasury-owner", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let after = client.get_roles().await?;
        if after.owner.active != signer.address() || after.owner.pending.is_some() {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "roles.owner".to_string(),
                expected: format!("active {}, no pending", signer.address()),
                actual: format!(
                    "active {}, pending {:?}",
                    after.owner.active, after.owner.pending
                ),
            }));
        }
        output.success(&format!("{} is now the treasury owner", after.owner.active))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument_parsing::SignerArgs;
    use lib_ledger::types::{Address, Role};
    use lib_ledger::ObjectId;

    fn addr(last: char) -> Address {
        format!("0x{}{}", "0".repeat(63), last).parse().unwrap()
    }

    fn id(last: char) -> ObjectId {
        format!("0x{}{}", "0".repeat(63), last).parse().unwrap()
    }

    fn roles() -> TreasuryRoles {
        TreasuryRoles {
            owner: Role {
                active: addr('a'),
                pending: None,
            },
            master_minter: addr('b'),
            blocklister: addr('c'),
            pauser: addr('d'),
            metadata_updater: addr('e'),
        }
    }

    fn request(
        new_pauser: Option<Address>,
        new_owner: Option<Address>,
    ) -> RotatePrivilegedRolesArgs {
        RotatePrivilegedRolesArgs {
            treasury_id: id('1'),
            new_master_minter: None,
            new_blocklister: None,
            new_pauser,
            new_metadata_updater: None,
            new_owner,
            signer: SignerArgs {
                private_key: "unused".to_string(),
            },
        }
    }

    #[test]
    fn test_plan_rotation_drops_matching_targets() {
        // Requested pauser already holds the role: empty plan.
        let plan = plan_rotation(&request(Some(addr('d')), None), &roles());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_rotation_keeps_differing_targets() {
        let plan = plan_rotation(&request(Some(addr('f')), None), &roles());
        assert_eq!(plan.new_pauser, Some(addr('f')));
        assert!(plan.new_owner.is_none());
    }

    #[test]
    fn test_plan_rotation_skips_already_pending_owner() {
        let mut live = roles();
        live.owner.pending = Some(addr('f'));
        let plan = plan_rotation(&request(None, Some(addr('f'))), &live);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_rotation_skips_self_transfer() {
        let plan = plan_rotation(&request(None, Some(addr('a'))), &roles());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_describe_rotation_plan() {
        let plan = plan_rotation(&request(Some(addr('f')), Some(addr('9'))), &roles());
        let text = describe_rotation_plan(&plan);
        assert!(text.contains("pauser"));
        assert!(text.contains("owner (proposal)"));
    }
}
