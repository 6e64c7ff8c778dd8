//! Read-only treasury inspection command

use crate::argument_parsing::{format_output, CliContext, TreasuryInfoArgs};
use crate::commands::common::connect;
use crate::error::{CliError, CliResult};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::{EpochSelector, TreasuryClient};
use serde_json::json;

pub async fn handle_treasury_info_command(
    args: TreasuryInfoArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    handle_treasury_info_with(args, ctx, &output).await
}

pub async fn handle_treasury_info_with(
    args: TreasuryInfoArgs,
    ctx: &CliContext,
    output: &dyn Output,
) -> CliResult<()> {
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let treasury = client.refresh().await?;

    let summary = json!({
        "treasury_id": treasury.id,
        "coin_type": client.coin_type.to_string(),
        "owner": treasury.roles.owner.active,
        "pending_owner": treasury.roles.owner.pending,
        "master_minter": treasury.roles.master_minter,
        "blocklister": treasury.roles.blocklister,
        "pauser": treasury.roles.pauser,
        "metadata_updater": treasury.roles.metadata_updater,
        "total_supply": treasury.total_supply,
        "compatible_versions": treasury.compatible_versions,
        "paused_current": client.is_paused(EpochSelector::Current).await?,
        "paused_next": client.is_paused(EpochSelector::Next).await?,
        "metadata": treasury.metadata,
    });

    let formatted = format_output(&summary, &ctx.format)
        .map_err(|e| CliError::Other(e.to_string()))?;
    output.header(&format!("Treasury {}", args.treasury_id))?;
    output.print(&formatted)?;
    Ok(())
}
