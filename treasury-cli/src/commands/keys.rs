//! Keypair generation command

use crate::argument_parsing::{CliContext, GenerateKeypairArgs};
use crate::error::{CliError, CliResult};
use crate::output::{ConsoleOutput, Output};
use lib_ledger::signer::KeystoreFile;
use lib_ledger::Signer;
use std::path::Path;

pub async fn handle_generate_keypair_command(
    args: GenerateKeypairArgs,
    ctx: &CliContext,
) -> CliResult<()> {
    let output = ConsoleOutput;
    handle_generate_keypair_with(args, ctx, &output).await
}

pub async fn handle_generate_keypair_with(
    args: GenerateKeypairArgs,
    _ctx: &CliContext,
    output: &dyn Output,
) -> CliResult<()> {
    let signer = Signer::generate();
    output.success("Generated new signing keypair")?;
    output.info(&format!("Address:    {}", signer.address()))?;
    output.info(&format!("Public key: {}", signer.public_key_base64()))?;

    match &args.out {
        Some(out) => {
            let path = Path::new(out);
            if path.exists() && !args.force {
                return Err(CliError::InvalidArgument(format!(
                    "Keystore file {} already exists (pass --force to overwrite)",
                    path.display()
                )));
            }
            KeystoreFile::from_signer(&signer).save(path)?;
            output.success(&format!("Keystore written to {}", path.display()))?;
        }
        None => {
            // No keystore requested: print the secret once so the operator
            // can capture it.
            output.warning("Store this private key securely; it is not persisted anywhere")?;
            output.print(&signer.private_key_hex())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::testing::test_ctx;
    use crate::output::testing::MockOutput;

    #[tokio::test]
    async fn test_generate_keypair_writes_keystore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.json");
        let args = GenerateKeypairArgs {
            out: Some(path.to_str().unwrap().to_string()),
            force: false,
        };
        let output = MockOutput::new();
        handle_generate_keypair_with(args, &test_ctx(false), &output)
            .await
            .unwrap();

        let keystore = KeystoreFile::load(&path).unwrap();
        let restored = Signer::parse(&keystore.private_key).unwrap();
        assert_eq!(restored.address(), keystore.address);
        output.assert_contains_message("Address:");
    }

    #[tokio::test]
    async fn test_generate_keypair_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.json");
        std::fs::write(&path, "{}").unwrap();
        let args = GenerateKeypairArgs {
            out: Some(path.to_str().unwrap().to_string()),
            force: false,
        };
        let output = MockOutput::new();
        let err = handle_generate_keypair_with(args, &test_ctx(false), &output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_generate_keypair_overwrites_with_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operator.json");
        std::fs::write(&path, "{}").unwrap();
        let args = GenerateKeypairArgs {
            out: Some(path.to_str().unwrap().to_string()),
            force: true,
        };
        let output = MockOutput::new();
        handle_generate_keypair_with(args, &test_ctx(false), &output)
            .await
            .unwrap();
        assert!(KeystoreFile::load(&path).is_ok());
    }
}
