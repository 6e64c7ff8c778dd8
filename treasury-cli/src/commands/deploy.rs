//! Deploy command
//!
//! Publishes a pre-built contract package and locates the treasury object it
//! creates. Compilation itself happens outside this tool; the input is the
//! build artifact: base64 module bytecode plus dependency object ids.

use crate::argument_parsing::{CliContext, DeployArgs};
use crate::commands::common::{confirm_or_abort, connect, load_signer, log_and_report};
use crate::confirm::{self, Confirm};
use crate::error::{CliError, CliResult};
use crate::output::{ConsoleOutput, Output};
use base64::{engine::general_purpose, Engine as _};
use lib_ledger::rpc::{TransactionData, TransactionKind};
use lib_ledger::{ObjectId, TreasuryClient};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// PURE LOGIC - Artifact handling
// ============================================================================

/// Built package artifact as emitted by the external compiler toolchain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageArtifact {
    /// Compiled modules, base64-encoded
    pub modules: Vec<String>,
    /// Object ids of the packages this one links against
    pub dependencies: Vec<ObjectId>,
}

pub fn load_package_artifact(path: &Path) -> CliResult<PackageArtifact> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Failed to read package artifact {}: {}",
            path.display(),
            e
        ))
    })?;
    let artifact: PackageArtifact = serde_json::from_str(&raw).map_err(|e| {
        CliError::InvalidArgument(format!(
            "Invalid package artifact {}: {}",
            path.display(),
            e
        ))
    })?;
    if artifact.modules.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "Package artifact {} contains no modules",
            path.display()
        )));
    }
    Ok(artifact)
}

/// Digest of the module set, as the upgrade entry point expects it: the hash
/// of all decoded module bytes in order, hex-encoded.
pub fn modules_digest(artifact: &PackageArtifact) -> CliResult<String> {
    let mut hasher = blake3::Hasher::new();
    for (i, module) in artifact.modules.iter().enumerate() {
        let bytes = general_purpose::STANDARD.decode(module).map_err(|e| {
            CliError::InvalidArgument(format!("Module {} is not valid base64: {}", i, e))
        })?;
        hasher.update(&bytes);
    }
    let digest: [u8; 32] = hasher.finalize().into();
    Ok(hex::encode(digest))
}

// ============================================================================
// IMPERATIVE SHELL - Command handler
// ============================================================================

pub async fn handle_deploy_command(args: DeployArgs, ctx: &CliContext) -> CliResult<()> {
    let output = ConsoleOutput;
    let confirm = confirm::for_invocation(ctx.auto_yes);
    handle_deploy_with(args, ctx, &output, confirm.as_ref()).await
}

pub async fn handle_deploy_with(
    args: DeployArgs,
    ctx: &CliContext,
    output: &dyn Output,
    confirm: &dyn Confirm,
) -> CliResult<()> {
    let signer = load_signer(&args.signer.private_key)?;
    let artifact = load_package_artifact(Path::new(&args.package_artifact))?;
    let rpc = connect(ctx);

    confirm_or_abort(
        confirm,
        output,
        &format!(
            "Publish package: {} modules, {} dependencies, sender {}",
            artifact.modules.len(),
            artifact.dependencies.len(),
            signer.address()
        ),
        ctx,
    )?;

    let tx = TransactionData {
        sender: signer.address(),
        kind: TransactionKind::Publish {
            modules: artifact.modules.clone(),
            dependencies: artifact.dependencies.clone(),
        },
        gas_budget: ctx.settings.gas_budget,
    };
    let receipt = if ctx.dry_run {
        rpc.dry_run(&tx).await?
    } else {
        rpc.execute(&tx, &signer).await?.ensure_success()?
    };
    log_and_report("deploy", &receipt, output, ctx)?;

    if !ctx.dry_run {
        // Exactly one treasury object must come out of the publish.
        let client = TreasuryClient::from_deployment(connect(ctx), &receipt)?;
        output.success(&format!(
            "Treasury {} created for coin type {} (package {})",
            client.treasury_id, client.coin_type, client.package_id
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact_json() -> String {
        let deps = format!("0x{}", "2".repeat(64));
        format!(
            "{{\"modules\": [\"{}\"], \"dependencies\": [\"{}\"]}}",
            general_purpose::STANDARD.encode(b"module-bytes"),
            deps
        )
    }

    #[test]
    fn test_load_package_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(artifact_json().as_bytes()).unwrap();

        let artifact = load_package_artifact(&path).unwrap();
        assert_eq!(artifact.modules.len(), 1);
        assert_eq!(artifact.dependencies.len(), 1);
    }

    #[test]
    fn test_load_package_artifact_rejects_empty_modules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        std::fs::write(&path, "{\"modules\": [], \"dependencies\": []}").unwrap();
        let err = load_package_artifact(&path).unwrap_err();
        assert!(err.to_string().contains("no modules"));
    }

    #[test]
    fn test_load_package_artifact_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.json");
        std::fs::write(
            &path,
            "{\"modules\": [\"AAEC\"], \"dependencies\": [], \"extra\": 1}",
        )
        .unwrap();
        assert!(load_package_artifact(&path).is_err());
    }

    #[test]
    fn test_modules_digest_is_deterministic() {
        let artifact = PackageArtifact {
            modules: vec![general_purpose::STANDARD.encode(b"module-bytes")],
            dependencies: Vec::new(),
        };
        let a = modules_digest(&artifact).unwrap();
        let b = modules_digest(&artifact).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_modules_digest_rejects_bad_base64() {
        let artifact = PackageArtifact {
            modules: vec!["!!! not base64 !!!".to_string()],
            dependencies: Vec::new(),
        };
        assert!(modules_digest(&artifact).is_err());
    }
}
