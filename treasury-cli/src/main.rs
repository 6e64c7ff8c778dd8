//! Treasury Operations Command-Line Interface
//!
//! Entry point for the treasury-cli binary. Parses command-line arguments
//! and delegates to the appropriate command handler.

use treasury_cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run_cli().await
}
