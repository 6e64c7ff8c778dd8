//! Metadata command
//!
//! Replaces the coin metadata (name, symbol, description, icon URL). Skips
//! submission entirely when the live metadata already matches.

use crate::argument_parsing::{CliContext, UpdateMetadataArgs};
use crate::commands::common::{
    call_options, confirm_or_abort, connect, load_signer, log_and_report,
};
use crate::confirm::{self, Confirm};
use crate::error::CliResult;
use crate::logic::preconditions::require_authority;
use crate::output::{ConsoleOutput, Output};
use lib_ledger::treasury::MetadataUpdate;
use lib_ledger::types::CoinMetadata;
use lib_ledger::TreasuryClient;

/// True when the live metadata already carries the requested values.
pub fn metadata_matches(current: &CoinMetadata, update: &MetadataUpdate) -> bool {
    current.name == update.name
        && current.symbol == update.symbol
        && current.description == update.description
        && current.icon_url == update.icon_url
}

pub async fn handle_update_metadata_command(
    args: UpdateMetadataArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_update_metadata_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_update_metadata_with(
    args: UpdateMetadataArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let client = TreasuryClient::from_object_id(connect(ctx), args.treasury_id.clone()).await?;
    let opts = call_options(ctx);

    let roles = client.get_roles().await?;
    require_authority(&signer.address(), &roles.metadata_updater, "metadata updater")?;

    let update = MetadataUpdate {
        name: args.name,
        symbol: args.symbol,
        description: args.description,
        icon_url: args.icon_url,
    };
    let current = client.get_metadata().await?;
    if metadata_matches(&current, &update) {
        output.info("Metadata already matches; nothing to submit")?;
        return Ok(());
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Update metadata of {} to name='{}', symbol='{}'",
            client.coin_type.name, update.name, update.symbol
        ),
        ctx,
    )?;
    let receipt = client.update_metadata(&signer, &update, &opts).await?;
    log_and_report("update-metadata", &receipt, output, ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> CoinMetadata {
        CoinMetadata {
            name: "USD Example".to_string(),
            symbol: "USDX".to_string(),
            description: "Example dollar".to_string(),
            icon_url: "https://example.com/usdx.svg".to_string(),
            decimals: 6,
        }
    }

    #[test]
    fn test_metadata_matches_ignores_decimals() {
        let update = MetadataUpdate {
            name: "USD Example".to_string(),
            symbol: "USDX".to_string(),
            description: "Example dollar".to_string(),
            icon_url: "https://example.com/usdx.svg".to_string(),
        };
        assert!(metadata_matches(&current(), &update));
    }

    #[test]
    fn test_metadata_differs_on_any_field() {
        let mut update = MetadataUpdate {
            name: "USD Example".to_string(),
            symbol: "USDX".to_string(),
            description: "Example dollar".to_string(),
            icon_url: "https://example.com/usdx.svg".to_string(),
        };
        update.symbol = "USDY".to_string();
        assert!(!metadata_matches(&current(), &update));
    }
}
