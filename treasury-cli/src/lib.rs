//! Treasury Operations CLI Library
//!
//! Operator tooling for a stablecoin issuer: deploy, configure, upgrade, and
//! audit on-chain treasury state through the remote ledger client wrappers
//! in `lib-ledger`.
//!
//! ## Architecture
//!
//! This crate follows the **Functional Core, Imperative Shell** pattern:
//!
//! - **Pure logic** (`logic/` module): amount scaling, precondition checks,
//!   summaries
//! - **Imperative shell** (`commands/` module): network calls, prompts,
//!   receipt logging, command orchestration
//! - **Error handling** (`error` module): structured, domain-specific errors
//! - **Output / Confirm abstractions** (`output`, `confirm` modules):
//!   injectable printing and confirmation capabilities so interactive and
//!   automated runs share one code path

pub mod argument_parsing;
pub mod cli_config;
pub mod commands;
pub mod confirm;
pub mod error;
pub mod logic;
pub mod output;
pub mod receipt_log;

pub use argument_parsing::{run_cli, format_output, TreasuryCli, TreasuryCommand};
pub use error::{CliError, CliResult};
pub use output::Output;

/// Treasury CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
