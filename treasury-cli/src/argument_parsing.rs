//! Treasury Operations CLI
//!
//! Command-line surface for the treasury operations toolkit: one subcommand
//! per operational task, each with required/optional flags for object
//! identifiers, private-key material, the RPC endpoint, gas budget, and a
//! dry-run toggle.

use crate::cli_config::{self, RuntimeSettings};
use crate::commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lib_ledger::{Address, ObjectId};
use serde_json::Value;

/// Treasury Operations CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(name = "treasury-cli")]
pub struct TreasuryCli {
    /// Ledger fullnode RPC endpoint URL
    #[arg(long, env = "TREASURY_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Gas budget for submitted transactions
    #[arg(long, env = "TREASURY_GAS_BUDGET")]
    pub gas_budget: Option<u64>,

    /// Simulate instead of submitting; prints the effects preview
    #[arg(long, env = "TREASURY_DRY_RUN")]
    pub dry_run: bool,

    /// Skip the confirmation prompt (automation mode)
    #[arg(short, long, env = "TREASURY_YES")]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long, env = "TREASURY_VERBOSE")]
    pub verbose: bool,

    /// Output format (json, table)
    #[arg(short, long, default_value = "table", env = "TREASURY_FORMAT")]
    pub format: String,

    /// Configuration file path
    #[arg(short, long, env = "TREASURY_CONFIG")]
    pub config: Option<String>,

    /// Directory for transaction receipt logs
    #[arg(long, env = "TREASURY_LOGS_DIR")]
    pub logs_dir: Option<String>,

    #[command(subcommand)]
    pub command: TreasuryCommand,
}

/// Signing credential flag shared by mutating commands
#[derive(Args, Debug, Clone)]
pub struct SignerArgs {
    /// Signing key material (32-byte hex, 0x-prefixed or not, or base64)
    #[arg(long, env = "TREASURY_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

/// Treasury operations commands
#[derive(Subcommand, Debug, Clone)]
pub enum TreasuryCommand {
    /// Publish the contract package and locate the created treasury
    Deploy(DeployArgs),

    /// Configure a controller/minter pair and its allowance (idempotent)
    ConfigureMinter(ConfigureMinterArgs),

    /// Atomically rebind a mint authorization to a new controller
    RotateController(RotateControllerArgs),

    /// Set the signing controller's mint allowance
    SetMintAllowance(SetMintAllowanceArgs),

    /// Mint tokens to a recipient
    Mint(MintArgs),

    /// Add or remove an address from the blocklist
    SetBlocklist(SetBlocklistArgs),

    /// Pause or unpause the coin
    SetPause(SetPauseArgs),

    /// Replace the coin metadata
    UpdateMetadata(UpdateMetadataArgs),

    /// Rotate privileged roles; the owner change is a two-phase proposal
    RotatePrivilegedRoles(RotatePrivilegedRolesArgs),

    /// Accept a pending treasury ownership transfer
    AcceptTreasuryOwner(AcceptTreasuryOwnerArgs),

    /// Print roles, metadata, supply, pause flags, and compatible versions
    TreasuryInfo(TreasuryInfoArgs),

    /// Deposit a package upgrade capability into the upgrade service
    DepositUpgradeCap(DepositUpgradeCapArgs),

    /// Propose a new upgrade-service admin (two-phase)
    ChangeUpgradeServiceAdmin(ChangeUpgradeServiceAdminArgs),

    /// Accept a pending upgrade-service admin transfer
    AcceptUpgradeServiceAdmin(AcceptUpgradeServiceAdminArgs),

    /// Upgrade the wrapped package through the upgrade service
    Upgrade(UpgradeArgs),

    /// Start, abort, or complete a compatible-version migration
    UpgradeMigration(UpgradeMigrationArgs),

    /// Validate live treasury state against expected-state documents
    ValidateTreasuryStates(ValidateStatesArgs),

    /// Validate live upgrade-service state against expected-state documents
    ValidateUpgradeServiceStates(ValidateStatesArgs),

    /// Generate a fresh signing keypair
    GenerateKeypair(GenerateKeypairArgs),

    /// Sign and submit a pre-built transaction payload
    ExecuteTransaction(ExecuteTransactionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Path to the built package artifact (JSON with modules and dependencies)
    #[arg(long)]
    pub package_artifact: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigureMinterArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Controller address to configure
    #[arg(long)]
    pub controller: Address,

    /// Minter address receiving the mint authorization
    #[arg(long)]
    pub minter: Address,

    /// Allowance in whole tokens (scaled by the coin's decimals)
    #[arg(long)]
    pub allowance: u64,

    /// Master minter signing key (creates the controller binding)
    #[arg(long, env = "TREASURY_MASTER_MINTER_KEY", hide_env_values = true)]
    pub master_minter_key: String,

    /// Controller signing key (sets the allowance)
    #[arg(long, env = "TREASURY_CONTROLLER_KEY", hide_env_values = true)]
    pub controller_key: String,
}

#[derive(Args, Debug, Clone)]
pub struct RotateControllerArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Controller being replaced
    #[arg(long)]
    pub old_controller: Address,

    /// Controller taking over the mint authorization
    #[arg(long)]
    pub new_controller: Address,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SetMintAllowanceArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Allowance in whole tokens (scaled by the coin's decimals)
    #[arg(long)]
    pub allowance: u64,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct MintArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Mint authorization object id held by the signer
    #[arg(long)]
    pub mint_cap_id: ObjectId,

    /// Amount in whole tokens (scaled by the coin's decimals)
    #[arg(long)]
    pub amount: u64,

    /// Recipient address
    #[arg(long)]
    pub recipient: Address,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SetBlocklistArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Address to block (or unblock)
    #[arg(long)]
    pub address: Address,

    /// Remove the address from the blocklist instead of adding it
    #[arg(long)]
    pub unblock: bool,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SetPauseArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Unpause instead of pausing
    #[arg(long)]
    pub unpause: bool,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateMetadataArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Coin name
    #[arg(long)]
    pub name: String,

    /// Coin symbol
    #[arg(long)]
    pub symbol: String,

    /// Coin description
    #[arg(long)]
    pub description: String,

    /// Icon URL
    #[arg(long)]
    pub icon_url: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RotatePrivilegedRolesArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// New master minter address
    #[arg(long)]
    pub new_master_minter: Option<Address>,

    /// New blocklister address
    #[arg(long)]
    pub new_blocklister: Option<Address>,

    /// New pauser address
    #[arg(long)]
    pub new_pauser: Option<Address>,

    /// New metadata updater address
    #[arg(long)]
    pub new_metadata_updater: Option<Address>,

    /// Proposed new owner (requires the matching accept to take effect)
    #[arg(long)]
    pub new_owner: Option<Address>,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AcceptTreasuryOwnerArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TreasuryInfoArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,
}

#[derive(Args, Debug, Clone)]
pub struct DepositUpgradeCapArgs {
    /// Upgrade service object id
    #[arg(long)]
    pub upgrade_service_id: ObjectId,

    /// Upgrade capability object id to deposit
    #[arg(long)]
    pub upgrade_cap_id: ObjectId,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ChangeUpgradeServiceAdminArgs {
    /// Upgrade service object id
    #[arg(long)]
    pub upgrade_service_id: ObjectId,

    /// Proposed new admin address
    #[arg(long)]
    pub new_admin: Address,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct AcceptUpgradeServiceAdminArgs {
    /// Upgrade service object id
    #[arg(long)]
    pub upgrade_service_id: ObjectId,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UpgradeArgs {
    /// Upgrade service object id
    #[arg(long)]
    pub upgrade_service_id: ObjectId,

    /// Path to the built package artifact for the new version
    #[arg(long)]
    pub package_artifact: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UpgradeMigrationArgs {
    /// Treasury object id
    #[arg(long)]
    pub treasury_id: ObjectId,

    /// Migration action (start, abort, complete)
    #[arg(long, value_parser = ["start", "abort", "complete"])]
    pub action: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateStatesArgs {
    /// Path to a JSON array of expected-state documents
    #[arg(long)]
    pub expected: String,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateKeypairArgs {
    /// Write the keystore JSON here instead of only printing the address
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite an existing keystore file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExecuteTransactionArgs {
    /// Path to a JSON transaction payload to sign and submit
    #[arg(long)]
    pub tx_file: String,

    #[command(flatten)]
    pub signer: SignerArgs,
}

/// Per-invocation context handed to every command handler.
#[derive(Debug, Clone)]
pub struct CliContext {
    pub settings: RuntimeSettings,
    pub dry_run: bool,
    pub auto_yes: bool,
    pub format: String,
}

/// Main CLI runner
pub async fn run_cli() -> Result<()> {
    let cli = TreasuryCli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .init();
    }

    let config = cli_config::load_config(cli.config.as_deref())?;
    let settings = cli_config::resolve_settings(
        cli.rpc_url.as_deref(),
        cli.gas_budget,
        cli.logs_dir.as_deref(),
        &config,
    );
    let ctx = CliContext {
        settings,
        dry_run: cli.dry_run,
        auto_yes: cli.yes,
        format: cli.format.clone(),
    };

    let result = match cli.command.clone() {
        TreasuryCommand::Deploy(args) => commands::deploy::handle_deploy_command(args, &ctx).await,
        TreasuryCommand::ConfigureMinter(args) => {
            commands::minter::handle_configure_minter_command(args, &ctx).await
        }
        TreasuryCommand::RotateController(args) => {
            commands::minter::handle_rotate_controller_command(args, &ctx).await
        }
        TreasuryCommand::SetMintAllowance(args) => {
            commands::minter::handle_set_mint_allowance_command(args, &ctx).await
        }
        TreasuryCommand::Mint(args) => commands::minter::handle_mint_command(args, &ctx).await,
        TreasuryCommand::SetBlocklist(args) => {
            commands::blocklist::handle_set_blocklist_command(args, &ctx).await
        }
        TreasuryCommand::SetPause(args) => {
            commands::pause::handle_set_pause_command(args, &ctx).await
        }
        TreasuryCommand::UpdateMetadata(args) => {
            commands::metadata::handle_update_metadata_command(args, &ctx).await
        }
        TreasuryCommand::RotatePrivilegedRoles(args) => {
            commands::roles::handle_rotate_privileged_roles_command(args, &ctx).await
        }
        TreasuryCommand::AcceptTreasuryOwner(args) => {
            commands::roles::handle_accept_treasury_owner_command(args, &ctx).await
        }
        TreasuryCommand::TreasuryInfo(args) => {
            commands::info::handle_treasury_info_command(args, &ctx).await
        }
        TreasuryCommand::DepositUpgradeCap(args) => {
            commands::upgrade::handle_deposit_upgrade_cap_command(args, &ctx).await
        }
        TreasuryCommand::ChangeUpgradeServiceAdmin(args) => {
            commands::upgrade::handle_change_admin_command(args, &ctx).await
        }
        TreasuryCommand::AcceptUpgradeServiceAdmin(args) => {
            commands::upgrade::handle_accept_admin_command(args, &ctx).await
        }
        TreasuryCommand::Upgrade(args) => {
            commands::upgrade::handle_upgrade_command(args, &ctx).await
        }
        TreasuryCommand::UpgradeMigration(args) => {
            commands::upgrade::handle_upgrade_migration_command(args, &ctx).await
        }
        TreasuryCommand::ValidateTreasuryStates(args) => {
            commands::validate::handle_validate_treasury_states_command(args, &ctx).await
        }
        TreasuryCommand::ValidateUpgradeServiceStates(args) => {
            commands::validate::handle_validate_upgrade_service_states_command(args, &ctx).await
        }
        TreasuryCommand::GenerateKeypair(args) => {
            commands::keys::handle_generate_keypair_command(args, &ctx).await
        }
        TreasuryCommand::ExecuteTransaction(args) => {
            commands::tx::handle_execute_transaction_command(args, &ctx).await
        }
    };

    result.map_err(anyhow::Error::from)
}

/// Format output based on CLI format preference
pub fn format_output(data: &Value, format: &str) -> Result<String> {
    match format {
        "json" => Ok(serde_json::to_string_pretty(data)?),
        "table" => {
            if let Some(obj) = data.as_object() {
                let mut result = String::new();
                for (key, value) in obj {
                    result.push_str(&format!("{:<24} {}\n", key, value));
                }
                Ok(result)
            } else if let Some(array) = data.as_array() {
                let mut result = String::new();
                for (i, item) in array.iter().enumerate() {
                    result.push_str(&format!("[{}] {}\n", i, item));
                }
                Ok(result)
            } else {
                Ok(data.to_string())
            }
        }
        _ => Err(anyhow::anyhow!("Unsupported output format: {}", format)),
    }
}
