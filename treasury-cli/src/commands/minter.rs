//! Minter configuration commands
//!
//! Covers the controller/minter lifecycle:
//! - `configure-minter`: idempotent multi-step configuration of a
//!   controller/minter pair and its allowance
//! - `rotate-controller`: atomic rebinding of a mint authorization
//! - `set-mint-allowance`: allowance adjustment by the signing controller
//! - `mint`: minting against a held authorization

use crate::argument_parsing::{
    CliContext, ConfigureMinterArgs, MintArgs, RotateControllerArgs, SetMintAllowanceArgs,
};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::logic::amounts::{format_amount, scale_amount};
use crate::logic::preconditions::require_authority;
use crate::output::{ConsoleOutput, Output};
use lib_ledger::receipt::ObjectOwner;
use lib_ledger::reconcile::{reconcile, Reconciliation};
use lib_ledger::types::Address;
use lib_ledger::{LedgerError, ObjectId, TreasuryClient};

// ============================================================================
// PURE LOGIC - Summaries and checks
// ============================================================================

/// Describe a controller rotation for the confirmation prompt.
pub fn describe_rotation(
    old_controller: &Address,
    new_controller: &Address,
    mint_cap: &ObjectId,
) -> String {
    format!(
        "Rotate mint authorization {} from controller {} to controller {} (one atomic transaction)",
        mint_cap, old_controller, new_controller
    )
}

/// The holder an authorization object must have for minting to proceed.
pub fn holder_address(owner: &ObjectOwner) -> Option<&Address> {
    match owner {
        ObjectOwner::Address { address } => Some(address),
        _ => None,
    }
}

// ============================================================================
// IMPERATIVE SHELL - Command handlers
// ============================================================================

pub async fn handle_configure_minter_command(
    args: ConfigureMinterArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_configure_minter_with(args, ctx, &output, confirm.as_ref()).await
}

/// Idempotent configuration: each step is classified as absent, matching, or
/// conflicting before anything is submitted, so re-running with identical
/// parameters performs zero redundant mutating calls.
pub async fn handle_configure_minter_with(
    args: ConfigureMinterArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let master_minter = load_signer(&args.master_minter_key)?;
    let controller_key = load_signer(&args.controller_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&master_minter.address(), &roles.master_minter, "master minter")?;
    require_authority(&controller_key.address(), &args.controller, "controller")?;

    // Step 1: controller binding
    let mint_cap = match client.get_mint_cap_id(&args.controller).await? {
        None => {
            confirm_or_abort(
                confirm,
                output,
                &format!(
                    "Configure new controller {} with mint authorization for {}",
                    args.controller, args.minter
                ),
                ctx,
            )?;
            let receipt = client
                .configure_new_controller(&master_minter, &args.controller, &args.minter, &opts)
                .await?;
            log_and_report("configure-minter-controller", &receipt, output, ctx)?;
            if ctx.dry_run {
                output.info("Dry run: controller does not exist yet, skipping allowance step")?;
                return Ok(());
            }
            client
                .get_mint_cap_id(&args.controller)
                .await?
                .ok_or_else(|| {
                    LedgerError::Precondition(format!(
                        "Controller {} not visible after configuration",
                        args.controller
                    ))
                })?
        }
        Some(cap) => {
            let holder = client.get_object_owner(&cap).await?;
            match reconcile(&args.minter, holder_address(&holder)) {
                Reconciliation::Matching => {
                    output.info(&format!(
                        "Controller {} already configured with minter {}; skipping creation",
                        args.controller, args.minter
                    ))?;
                    cap
                }
                state => {
                    return Err(CliError::Ledger(LedgerError::Precondition(format!(
                        "Controller {} is already bound to mint authorization {} ({})",
                        args.controller, cap, state
                    ))));
                }
            }
        }
    };

    // Step 2: allowance
    let decimals = client.get_metadata().await?.decimals;
    let target = scale_amount(args.allowance, decimals)?;
    let current = client.get_mint_allowance(&mint_cap).await?;
    if reconcile(&target, current.as_ref()).is_matching() {
        output.info(&format!(
            "Allowance already {} base units; nothing to submit",
            target
        ))?;
        return Ok(());
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Set allowance for controller {} to {} {} ({} base units)",
            args.controller,
            args.allowance,
            client.coin_type.name,
            target
        ),
        ctx,
    )?;
    let receipt = client
        .set_mint_allowance(&controller_key, target, &opts)
        .await?;
    log_and_report("configure-minter-allowance", &receipt, output, ctx)?;

    if !ctx.dry_run {
        // Exact round trip: the allowance read back must equal what was set.
        let read_back = client.get_mint_allowance(&mint_cap).await?;
        if read_back != Some(target) {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "mint_allowance".to_string(),
                expected: target.to_string(),
                actual: format!("{:?}", read_back),
            }));
        }
    }
    Ok(())
}

pub async fn handle_rotate_controller_command(
    args: RotateControllerArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_rotate_controller_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_rotate_controller_with(
    args: RotateControllerArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.master_minter, "master minter")?;

    let mint_cap = client
        .get_mint_cap_id(&args.old_controller)
        .await?
        .ok_or_else(|| {
            LedgerError::Precondition(format!(
                "No mint authorization configured for controller {}",
                args.old_controller
            ))
        })?;

    if client.get_mint_cap_id(&args.new_controller).await?.is_some() {
        return Err(CliError::Ledger(LedgerError::Precondition(format!(
            "Controller {} is already configured",
            args.new_controller
        ))));
    }

    confirm_or_abort(
        confirm,
        output,
        &describe_rotation(&args.old_controller, &args.new_controller, &mint_cap),
        ctx,
    )?;
    let receipt = client
        .rotate_controller(&signer, &args.new_controller, &args.old_controller, &opts)
        .await?;
    log_and_report("rotate-controller", &receipt, output, ctx)?;

    if !ctx.dry_run {
        // Both sides of the rotation must be visible together.
        if client.get_mint_cap_id(&args.old_controller).await?.is_some() {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "controllers.old".to_string(),
                expected: "not configured".to_string(),
                actual: "still configured".to_string(),
            }));
        }
        match client.get_mint_cap_id(&args.new_controller).await? {
            Some(cap) if cap == mint_cap => {}
            other => {
                return Err(CliError::Ledger(LedgerError::StateMismatch {
                    field: "controllers.new".to_string(),
                    expected: mint_cap.to_string(),
                    actual: format!("{:?}", other),
                }));
            }
        }
        output.success(&format!(
            "Controller rotated: {} now holds mint authorization {}",
            args.new_controller, mint_cap
        ))?;
    }
    Ok(())
}

pub async fn handle_set_mint_allowance_command(
    args: SetMintAllowanceArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_set_mint_allowance_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_set_mint_allowance_with(
    args: SetMintAllowanceArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let controller = signer.address();
    let mint_cap = client.get_mint_cap_id(&controller).await?.ok_or_else(|| {
        LedgerError::Precondition(format!(
            "Signer {} is not a configured controller",
            controller
        ))
    })?;

    let decimals = client.get_metadata().await?.decimals;
    let target = scale_amount(args.allowance, decimals)?;
    let current = client.get_mint_allowance(&mint_cap).await?;
    if reconcile(&target, current.as_ref()).is_matching() {
        output.info(&format!(
            "Allowance already {} base units; nothing to submit",
            target
        ))?;
        return Ok(());
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Set allowance of mint authorization {} to {} {} ({} base units)",
            mint_cap, args.allowance, client.coin_type.name, target
        ),
        ctx,
    )?;
    let receipt = client.set_mint_allowance(&signer, target, &opts).await?;
    log_and_report("set-mint-allowance", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let read_back = client.get_mint_allowance(&mint_cap).await?;
        if read_back != Some(target) {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "mint_allowance".to_string(),
                expected: target.to_string(),
                actual: format!("{:?}", read_back),
            }));
        }
    }
    Ok(())
}

pub async fn handle_mint_command(args: MintArgs, ctx: &CliContext) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_mint_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_mint_with(
    args: MintArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let owner = client.get_object_owner(&args.mint_cap_id).await?;
    match holder_address(&owner) {
        Some(holder) if *holder == signer.address() => {}
        _ => {
            return Err(CliError::Ledger(LedgerError::Precondition(format!(
                "Signer {} does not hold mint authorization {}",
                signer.address(),
                args.mint_cap_id
            ))));
        }
    }

    let decimals = client.get_metadata().await?.decimals;
    let base_units = scale_amount(args.amount, decimals)?;
    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Mint {} {} ({} base units) to {}",
            format_amount(base_units, decimals),
            client.coin_type.name,
            base_units,
            args.recipient
        ),
        ctx,
    )?;
    let receipt = client
        .mint(&signer, &args.mint_cap_id, base_units, &args.recipient, &opts)
        .await?;
    log_and_report("mint", &receipt, output, ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: char) -> Address {
        format!("0x{}{}", "0".repeat(63), last).parse().unwrap()
    }

    fn id(last: char) -> ObjectId {
        format!("0x{}{}", "0".repeat(63), last).parse().unwrap()
    }

    #[test]
    fn test_describe_rotation_names_all_parties() {
        let text = describe_rotation(&addr('a'), &addr('b'), &id('c'));
        assert!(text.contains(addr('a').as_str()));
        assert!(text.contains(addr('b').as_str()));
        assert!(text.contains(id('c').as_str()));
        assert!(text.contains("atomic"));
    }

    #[test]
    fn test_holder_address_only_for_account_owners() {
        let owned = ObjectOwner::Address { address: addr('a') };
        assert_eq!(holder_address(&owned), Some(&addr('a')));
        assert_eq!(holder_address(&ObjectOwner::Shared), None);
        assert_eq!(
            holder_address(&ObjectOwner::Object { object_id: id('b') }),
            None
        );
    }
}
