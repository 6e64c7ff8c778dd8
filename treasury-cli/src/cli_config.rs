//! CLI configuration loader.
//!
//! Optional TOML file under `~/.treasury/cli.toml` supplying defaults for the
//! RPC endpoint, gas budget, logs directory, and keystore path. Command-line
//! flags and environment variables always win over file values.

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default CLI config filename under ~/.treasury/
pub const DEFAULT_CONFIG_FILENAME: &str = "cli.toml";

/// Fallback gas budget when neither flag nor config supplies one.
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;

/// Fallback receipt-log directory.
pub const DEFAULT_LOGS_DIR: &str = "logs";

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    pub defaults: Option<CliDefaults>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct CliDefaults {
    pub rpc_url: Option<String>,
    pub gas_budget: Option<u64>,
    pub logs_dir: Option<String>,
    pub keystore: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        home.join(".treasury").join(DEFAULT_CONFIG_FILENAME)
    } else {
        PathBuf::from("./treasury-cli.toml")
    }
}

/// Load the config. A missing default config is an empty config; a missing
/// explicitly-passed config is an error.
pub fn load_config(path: Option<&str>) -> CliResult<CliConfig> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(default_config_path);

    if !config_path.exists() {
        if path.is_some() {
            return Err(CliError::ConfigLoadFailed {
                path: config_path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }
        return Ok(CliConfig::default());
    }

    let raw = fs::read_to_string(&config_path).map_err(|e| CliError::ConfigLoadFailed {
        path: config_path.display().to_string(),
        reason: e.to_string(),
    })?;

    toml::from_str(&raw).map_err(|e| CliError::ConfigLoadFailed {
        path: config_path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Settings for one invocation after merging flags, environment, and config.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub rpc_url: String,
    pub gas_budget: u64,
    pub logs_dir: PathBuf,
}

/// Merge order: explicit flag value, then config file default, then the
/// built-in fallback.
pub fn resolve_settings(
    flag_rpc_url: Option<&str>,
    flag_gas_budget: Option<u64>,
    flag_logs_dir: Option<&str>,
    config: &CliConfig,
) -> RuntimeSettings {
    let defaults = config.defaults.clone().unwrap_or_default();
    RuntimeSettings {
        rpc_url: flag_rpc_url
            .map(str::to_string)
            .or(defaults.rpc_url)
            .unwrap_or_else(|| "http://127.0.0.1:9000".to_string()),
        gas_budget: flag_gas_budget
            .or(defaults.gas_budget)
            .unwrap_or(DEFAULT_GAS_BUDGET),
        logs_dir: PathBuf::from(
            flag_logs_dir
                .map(str::to_string)
                .or(defaults.logs_dir)
                .unwrap_or_else(|| DEFAULT_LOGS_DIR.to_string()),
        ),
    }
}
