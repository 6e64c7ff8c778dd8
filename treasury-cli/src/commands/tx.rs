//! Execute-transaction command
//!
//! Signs and submits a pre-built transaction payload. Used for payloads
//! prepared out of band (e.g. by a multisig coordinator or an offline
//! builder); the payload's sender must match the signing key.

use crate::argument_parsing::{CliContext, ExecuteTransactionArgs};
use crate::commands::common::{confirm_or_abort, connect, load_signer, log_and_report};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::rpc::TransactionData;
use lib_ledger::LedgerError;
use std::path::Path;

/// Load and parse a transaction payload file.
pub fn load_transaction(path: &Path) -> CliResult<TransactionData> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Failed to read transaction file {}: {}",
            path.display(),
            e
        ))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Invalid transaction payload {}: {}",
            path.display(),
            e
        ))
    })
}

pub async fn handle_execute_transaction_command(
    args: ExecuteTransactionArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_execute_transaction_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_execute_transaction_with(
    args: ExecuteTransactionArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let tx = load_transaction(Path::new(&args.tx_file))?;

    if tx.sender != signer.address() {
        return Err(CliError::Ledger(LedgerError::Precondition(format!(
            "Transaction sender {} does not match signing key address {}",
            tx.sender,
            signer.address()
        ))));
    }

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Submit pre-built transaction from {} (gas budget {})",
            tx.sender, tx.gas_budget
        ),
        ctx,
    )?;

    let rpc = connect(ctx);
    let receipt = if ctx.dry_run {
        rpc.dry_run(&tx).await?
    } else {
        rpc.execute(&tx, &signer).await?.ensure_success()?
    };
    log_and_report("execute-transaction", &receipt, output, ctx)?;
    Ok(())
}
