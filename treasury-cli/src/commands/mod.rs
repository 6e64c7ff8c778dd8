//! Command handlers: the imperative shell.
//!
//! One module per operational domain. Every mutating handler follows the
//! same sequence: validate preconditions, confirm, submit, log-and-report.

pub mod blocklist;
pub mod common;
pub mod deploy;
pub mod info;
pub mod keys;
pub mod metadata;
pub mod minter;
pub mod pause;
pub mod roles;
pub mod tx;
pub mod upgrade;
pub mod validate;
