//! State validation commands
//!
//! Read-only: reconstructs the full observable state of each record named in
//! the expected-state document and asserts deep structural equality. Any
//! mismatch aborts with the first differing field; nothing is submitted.

use crate::argument_parsing::{CliContext, ValidateStatesArgs};
use crate::commands::common::connect;
use crate::error::{CliError, CliResult};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::validator::{
    parse_treasury_state_docs, parse_upgrade_service_state_docs, validate_treasury_state,
    validate_upgrade_service_state,
};
use lib_ledger::{TreasuryClient, UpgradeServiceClient};
use std::path::Path;

fn read_expected_file(path: &str) -> CliResult<String> {
    std::fs::read_to_string(Path::new(path)).map_err(|e| {
        CliError::InvalidArgument(format!("Failed to read expected-state file {}: {}", path, e))
    })
}

pub async fn handle_validate_treasury_states_command(
    args: ValidateStatesArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    handle_validate_treasury_states_with(args, ctx, &output).await
}

pub async fn handle_validate_treasury_states_with(
    args: ValidateStatesArgs,
    ctx: &CliContext,
    output: &dyn Output,
) -> CliResult<()> {
    let raw = read_expected_file(&args.expected)?;
    let docs = parse_treasury_state_docs(&raw)?;
    if docs.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Expected-state file {} contains no documents",
            args.expected
        )));
    }

    for doc in &docs {
        output.info(&format!("Validating treasury {}...", doc.treasury_id))?;
        let client =
            TreasuryClient::from_object_id(connect(ctx), doc.treasury_id.clone()).await?;
        validate_treasury_state(&client, doc).await?;
        output.success(&format!("Treasury {} matches expected state", doc.treasury_id))?;
    }
    output.success(&format!("{} treasury record(s) validated", docs.len()))?;
    Ok(())
}

pub async fn handle_validate_upgrade_service_states_command(
    args: ValidateStatesArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    handle_validate_upgrade_service_states_with(args, ctx, &output).await
}

pub async fn handle_validate_upgrade_service_states_with(
    args: ValidateStatesArgs,
    ctx: &CliContext,
    output: &dyn Output,
) -> CliResult<()> {
    let raw = read_expected_file(&args.expected)?;
    let docs = parse_upgrade_service_state_docs(&raw)?;
    if docs.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Expected-state file {} contains no documents",
            args.expected
        )));
    }

    for doc in &docs {
        output.info(&format!(
            "Validating upgrade service {}...",
            doc.upgrade_service_id
        ))?;
        let client =
            UpgradeServiceClient::from_object_id(connect(ctx), doc.upgrade_service_id.clone())
                .await?;
        validate_upgrade_service_state(&client, doc).await?;
        output.success(&format!(
            "Upgrade service {} matches expected state",
            doc.upgrade_service_id
        ))?;
    }
    output.success(&format!("{} upgrade service record(s) validated", docs.len()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_expected_file_missing() {
        let err = read_expected_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("not/here.json"));
    }

    #[test]
    fn test_malformed_document_rejected_before_any_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expected.json");
        std::fs::write(&path, "[{\"surprise\": true}]").unwrap();
        let raw = read_expected_file(path.to_str().unwrap()).unwrap();
        assert!(parse_treasury_state_docs(&raw).is_err());
    }
}
