//! Shared helpers for command handlers.

use crate::argument_parsing::CliContext;
use crate::confirm::Confirm;
use crate::error::{CliError, CliResult};
use crate::output::Output;
use crate::receipt_log;
use lib_ledger::treasury::CallOptions;
use lib_ledger::{LedgerRpc, Signer, TransactionReceipt};

/// Parse operator-supplied key material into a signing credential.
pub fn load_signer(material: &str) -> CliResult<Signer> {
    Signer::parse(material).map_err(|e| CliError::KeyError(e.to_string()))
}

/// Build an RPC client for this invocation's endpoint.
pub fn connect(ctx: &CliContext) -> LedgerRpc {
    LedgerRpc::new(ctx.settings.rpc_url.clone())
}

/// Submission options for this invocation.
pub fn call_options(ctx: &CliContext) -> CallOptions {
    CallOptions {
        gas_budget: ctx.settings.gas_budget,
        dry_run: ctx.dry_run,
    }
}

/// Print the action summary and ask the operator to confirm. A dry run skips
/// the prompt: nothing irreversible is about to happen.
pub fn confirm_or_abort(
    confirm: &dyn Confirm,
    output: &dyn Output,
    summary: &str,
    ctx: &CliContext,
) -> CliResult<()> {
    output.info(summary)?;
    if ctx.dry_run {
        output.info("Dry run: simulating without submitting")?;
        return Ok(());
    }
    if confirm.confirm("Submit this transaction?")? {
        Ok(())
    } else {
        Err(CliError::Aborted)
    }
}

/// Terminal step of every mutating command: persist the receipt (real runs)
/// or print the effects preview (dry runs).
pub fn log_and_report(
    operation: &str,
    receipt: &TransactionReceipt,
    output: &dyn Output,
    ctx: &CliContext,
) -> CliResult<()> {
    if ctx.dry_run {
        output.info("Dry run effects preview:")?;
        output.print_json(&serde_json::to_value(receipt)?)?;
        return Ok(());
    }
    let path = receipt_log::write_receipt(&ctx.settings.logs_dir, operation, receipt)?;
    output.success(&format!(
        "Transaction {} confirmed; receipt written to {}",
        receipt.digest,
        path.display()
    ))?;
    Ok(())
}
