//! CLI surface tests for treasury-cli
//!
//! Verifies the clap command tree is well-formed and that representative
//! invocations parse into the expected argument structures.

use clap::{CommandFactory, Parser};
use treasury_cli::argument_parsing::{TreasuryCli, TreasuryCommand};

fn hex_id(last: char) -> String {
    format!("0x{}{}", "0".repeat(63), last)
}

const KEY: &str = "0x9bfd2c724bea6e15f5d4f2431a3b6f1b24f4a052ab20b7bfb4b4eb2a6f3bba11";

#[test]
fn test_command_tree_is_well_formed() {
    TreasuryCli::command().debug_assert();
}

#[test]
fn test_parse_set_blocklist() {
    let cli = TreasuryCli::parse_from([
        "treasury-cli",
        "set-blocklist",
        "--treasury-id",
        &hex_id('1'),
        "--address",
        &hex_id('a'),
        "--private-key",
        KEY,
    ]);
    match cli.command {
        TreasuryCommand::SetBlocklist(args) => {
            assert_eq!(args.treasury_id.as_str(), hex_id('1'));
            assert_eq!(args.address.as_str(), hex_id('a'));
            assert!(!args.unblock);
        }
        other => panic!("parsed into wrong command: {:?}", other),
    }
}

#[test]
fn test_parse_configure_minter_with_two_keys() {
    let cli = TreasuryCli::parse_from([
        "treasury-cli",
        "configure-minter",
        "--treasury-id",
        &hex_id('1'),
        "--controller",
        &hex_id('2'),
        "--minter",
        &hex_id('3'),
        "--allowance",
        "1000",
        "--master-minter-key",
        KEY,
        "--controller-key",
        KEY,
    ]);
    match cli.command {
        TreasuryCommand::ConfigureMinter(args) => {
            assert_eq!(args.allowance, 1000);
            assert_eq!(args.controller.as_str(), hex_id('2'));
        }
        other => panic!("parsed into wrong command: {:?}", other),
    }
}

#[test]
fn test_parse_rejects_malformed_object_id() {
    let result = TreasuryCli::try_parse_from([
        "treasury-cli",
        "treasury-info",
        "--treasury-id",
        "0xnothex",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_global_flags() {
    let cli = TreasuryCli::parse_from([
        "treasury-cli",
        "--rpc-url",
        "http://node.example:9000",
        "--gas-budget",
        "123",
        "--dry-run",
        "--yes",
        "--format",
        "json",
        "treasury-info",
        "--treasury-id",
        &hex_id('1'),
    ]);
    assert_eq!(cli.rpc_url.as_deref(), Some("http://node.example:9000"));
    assert_eq!(cli.gas_budget, Some(123));
    assert!(cli.dry_run);
    assert!(cli.yes);
    assert_eq!(cli.format, "json");
}

#[test]
fn test_parse_upgrade_migration_action_is_validated() {
    let bad = TreasuryCli::try_parse_from([
        "treasury-cli",
        "upgrade-migration",
        "--treasury-id",
        &hex_id('1'),
        "--action",
        "sideways",
        "--private-key",
        KEY,
    ]);
    assert!(bad.is_err());

    let good = TreasuryCli::parse_from([
        "treasury-cli",
        "upgrade-migration",
        "--treasury-id",
        &hex_id('1'),
        "--action",
        "start",
        "--private-key",
        KEY,
    ]);
    match good.command {
        TreasuryCommand::UpgradeMigration(args) => assert_eq!(args.action, "start"),
        other => panic!("parsed into wrong command: {:?}", other),
    }
}

#[test]
fn test_parse_validate_and_keypair_commands() {
    let cli = TreasuryCli::parse_from([
        "treasury-cli",
        "validate-treasury-states",
        "--expected",
        "expected.json",
    ]);
    assert!(matches!(
        cli.command,
        TreasuryCommand::ValidateTreasuryStates(_)
    ));

    let cli = TreasuryCli::parse_from(["treasury-cli", "generate-keypair", "--out", "ks.json"]);
    match cli.command {
        TreasuryCommand::GenerateKeypair(args) => {
            assert_eq!(args.out.as_deref(), Some("ks.json"));
            assert!(!args.force);
        }
        other => panic!("parsed into wrong command: {:?}", other),
    }
}
