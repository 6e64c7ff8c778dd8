//! Blocklist command
//!
//! Adds or removes one address from the coin's blocklist. The write lands in
//! the next-epoch value immediately; the current-epoch value converges only
//! after the remote epoch boundary passes.

use crate::argument_parsing::{CliContext, SetBlocklistArgs};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::logic::preconditions::require_authority;
use crate::output::{ConsoleOutput, Output};
use lib_ledger::{EpochSelector, LedgerError, TreasuryClient};

pub async fn handle_set_blocklist_command(
    args: SetBlocklistArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_set_blocklist_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_set_blocklist_with(
    args: SetBlocklistArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.blocklister, "blocklister")?;

    let desired = !args.unblock;
    let already = client
        .is_blocklisted(&args.address, EpochSelector::Next)
        .await?;
    if already == desired {
        output.info(&format!(
            "Address {} already {} for the next epoch; nothing to submit",
            args.address,
            if desired { "blocklisted" } else { "unblocked" }
        ))?;
        return Ok(());
    }

    let action = if desired { "Blocklist" } else { "Unblock" };
    confirm_or_abort(
        confirm,
        output,
        &format!("{} address {} on {}", action, args.address, client.coin_type.name),
        ctx,
    )?;
    let receipt = client
        .set_blocklist_state(&signer, &args.address, desired, &opts)
        .await?;
    log_and_report("set-blocklist", &receipt, output, ctx)?;

    if !ctx.dry_run {
        // The next-epoch value must reflect the write immediately.
        let next = client
            .is_blocklisted(&args.address, EpochSelector::Next)
            .await?;
        if next != desired {
            return Err(CliError::Ledger(LedgerError::StateMismatch {
                field: "blocklist.next".to_string(),
                expected: desired.to_string(),
                actual: next.to_string(),
            }));
        }
        let current = client
            .is_blocklisted(&args.address, EpochSelector::Current)
            .await?;
        if current != desired {
            output.warning(&format!(
                "Current-epoch state is still {}; it converges after the next epoch boundary",
                current
            ))?;
        }
    }
    Ok(())
}
