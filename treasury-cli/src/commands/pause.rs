//! Pause command
//!
//! Pauses or unpauses the coin. Same epoch semantics as the blocklist: the
//! next-epoch flag reflects the write immediately, the current-epoch flag
//! after the boundary.

use crate::argument_parsing::{CliContext, SetPauseArgs};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::logic::preconditions::require_authority;
use crate::output::{ConsoleOutput, Output};
use lib_ledger::{EpochSelector, LedgerError, TreasuryClient};

pub async fn handle_set_pause_command(args: SetPauseArgs, ctx: &CliContext) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_set_pause_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_set_pause_with(
    args: SetPauseArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.pauser, "pauser")?;

    let desired = !args.unpause;
    let already = client.is_paused(EpochSelector::Next).await?;
    if already == desired {
        output.info(&format!(
            "{} already {} for the next epoch; nothing to submit",
            client.coin_type.name,
            if desired { "paused" } else { "unpaused" }
        ))?;
        return Ok(());
    }

    let action = if desired { "Pause" } else { "Unpause" };
    confirm_or_abort(
        confirm,
        output,
        &format!("{} {}", action, client.coin_type.name),
        ctx,
    )?;
    let receipt = client.set_paused_state(&signer, desired, &opts).await?;
    log_and_report("set-pause", &receipt, output, ctx)?;

    if !ctx.dry_run {
        let next = client.is_paused(EpochSelector::Next).await?;
        if next != desired {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "paused.next".to_string(),
                expected: desired.to_string(),
                actual: next.to_string(),
            }));
        }
        let current = client.is_paused(EpochSelector::Current).await?;
        if current != desired {
            output.warning(&format!(
                "Current-epoch state is still {}; it converges after the next epoch boundary",
                current
            ))?;
        }
    }
    Ok(())
}
