//! Upgrade service commands
//!
//! - `deposit-upgrade-cap`: hand the package's upgrade capability to the
//!   service
//! - `change-upgrade-service-admin` / `accept-upgrade-service-admin`: the
//!   two halves of the two-phase admin transfer
//! - `upgrade`: publish a new package version through the service
//! - `upgrade-migration`: drive the compatible-version migration state
//!   machine on the treasury

use crate::argument_parsing::{
    AcceptUpgradeServiceAdminArgs, ChangeUpgradeServiceAdminArgs, CliContext,
    DepositUpgradeCapArgs, UpgradeArgs, UpgradeMigrationArgs,
};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::commands::deploy::{load_package_artifact, modules_digest};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::logic::preconditions::{
    reject_duplicate_pending, require_authority, require_pending_authority,
};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::receipt::ObjectOwner;
use lib_ledger::types::MigrationAction;
use lib_ledger::{LedgerError, TreasuryClient, UpgradeServiceClient};
use std::path::Path;

pub async fn handle_deposit_upgrade_cap_command(
    args: DepositUpgradeCapArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_deposit_upgrade_cap_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_deposit_upgrade_cap_with(
    args: DepositUpgradeCapArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client =
        UpgradeServiceClient::from_object_id(connect(ctx), args.upgrade_service_id.clone()).await?;
    let opts = call_options(ctx);

    // The signer must actually hold the capability being deposited.
    let raw = client.rpc().get_object(&args.upgrade_cap_id).await?;
    match raw.owner {
        ObjectOwner::Address { ref address } if *address == signer.address() => {}
        other => {
            return Err(CliError::Ledger(LedgerError::Precondition(format!(
                "Signer {} does not hold upgrade capability {} (owner: {:?})",
                signer.address(),
                args.upgrade_cap_id,
                other
            ))));
        }
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Deposit upgrade capability {} into service {}",
            args.upgrade_cap_id, args.upgrade_service_id
        ),
        ctx,
    )?;
    let receipt = client
        .deposit_upgrade_cap(&signer, &args.upgrade_cap_id, &opts)
        .await?;
    log_and_report("deposit-upgrade-cap", &receipt, output, ctx)?;
    Ok(())
}

pub async fn handle_change_admin_command(
    args: ChangeUpgradeServiceAdminArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_change_admin_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_change_admin_with(
    args: ChangeUpgradeServiceAdminArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client =
        UpgradeServiceClient::from_object_id(connect(ctx), args.upgrade_service_id.clone()).await?;
    let opts = call_options(ctx);

    let admin = client.get_admin_role().await?;
    require_authority(&signer.address(), &admin.active, "upgrade service admin")?;
    reject_duplicate_pending(&admin, &args.new_admin, "admin")?;

    if admin.active == args.new_admin {
        output.info(&format!("{} is already the admin; nothing to submit", args.new_admin))?;
        return Ok(());
    }
    if admin.pending.as_ref() == Some(&args.new_admin) {
        output.info(&format!(
            "Admin transfer to {} is already pending; nothing to submit",
            args.new_admin
        ))?;
        return Ok(());
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Propose upgrade-service admin transfer {} -> {}",
            admin.active, args.new_admin
        ),
        ctx,
    )?;
    let receipt = client.change_admin(&signer, &args.new_admin, &opts).await?;
    log_and_report("change-upgrade-service-admin", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let after = client.get_admin_role().await?;
        if after.pending.as_ref() != Some(&args.new_admin) || after.active != admin.active {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "admin".to_string(),
                expected: format!("active {}, pending {}", admin.active, args.new_admin),
                actual: format!("active {}, pending {:?}", after.active, after.pending),
            }));
        }
        output.info(&format!(
            "Admin transfer to {} is pending; run accept-upgrade-service-admin with the new admin's key",
            args.new_admin
        ))?;
    }
    Ok(())
}

pub async fn handle_accept_admin_command(
    args: AcceptUpgradeServiceAdminArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_accept_admin_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_accept_admin_with(
    args: AcceptUpgradeServiceAdminArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client =
        UpgradeServiceClient::from_object_id(connect(ctx), args.upgrade_service_id.clone()).await?;
    let opts = call_options(ctx);

    let admin = client.get_admin_role().await?;
    require_pending_authority(&signer.address(), &admin, "admin")?;

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Accept upgrade-service admin transfer: {} -> {}",
            admin.active,
            signer.address()
        ),
        ctx,
    )?;
    let receipt = client.accept_admin(&signer, &opts).await?;
    log_and_report("accept-upgrade-service-admin", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let after = client.get_admin_role().await?;
        if after.active != signer.address() || after.pending.is_some() {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "admin".to_string(),
                expected: format!("active {}, no pending", signer.address()),
                actual: format!("active {}, pending {:?}", after.active, after.pending),
            }));
        }
        output.success(&format!("{} is now the upgrade-service admin", after.active))?;
    }
    Ok(())
}

pub async fn handle_upgrade_command(args: UpgradeArgs, ctx: &CliContext) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_upgrade_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_upgrade_with(
    args: UpgradeArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let artifact = load_package_artifact(Path::new(&args.package_artifact))?;
    let digest = modules_digest(&artifact)?;
    let client =
        UpgradeServiceClient::from_object_id(connect(ctx), args.upgrade_service_id.clone()).await?;
    let opts = call_options(ctx);

    let admin = client.get_admin_role().await?;
    require_authority(&signer.address(), &admin.active, "upgrade service admin")?;
    let before_version = client.get_upgrade_cap_version().await?;

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Upgrade package {} from version {} (modules digest {})",
            client.get_upgrade_cap_package_id().await?,
            before_version,
            digest
        ),
        ctx,
    )?;
    let receipt = client.upgrade(&signer, &digest, &opts).await?;
    log_and_report("upgrade", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let after_version = client.get_upgrade_cap_version().await?;
        output.success(&format!(
            "Package upgraded: version {} -> {}",
            before_version, after_version
        ))?;
    }
    Ok(())
}

pub async fn handle_upgrade_migration_command(
    args: UpgradeMigrationArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_upgrade_migration_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_upgrade_migration_with(
    args: UpgradeMigrationArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let action: MigrationAction = args.action.parse()?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.owner.active, "treasury owner")?;

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Issue migration action '{}' on treasury {}",
            args.action, args.treasury_id
        ),
        ctx,
    )?;
    let receipt = client.upgrade_migration(&signer, action, &opts).await?;
    log_and_report("upgrade-migration", &receipt, output, ctx)?;

    if !ctx.dry_run {
        // The transition is enforced remotely; confirm it took effect by
        // re-reading the compatible-version list.
        let versions = client.get_compatible_versions().await?;
        output.info(&format!("Compatible versions now: {:?}", versions))?;
    }
    Ok(())
}
