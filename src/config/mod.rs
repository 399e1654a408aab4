//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::ethereum::constants::{
    ANVIL_PRIVATE_KEY, DEFAULT_RECEIPT_TIMEOUT_SECS, DEFAULT_RPC_URL, DEFAULT_SOLC_VERSION,
};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Private key of the signing account (hex string, 0x prefix optional).
    pub private_key: String,
    /// Expected account address. Checked against the key when set.
    pub address: Option<String>,
    /// Solidity compiler version used when none is given explicitly.
    pub solc_version: String,
    /// Use this solc binary instead of installing one.
    pub solc_path: Option<PathBuf>,
    /// Directory where downloaded solc binaries are kept.
    pub solc_cache_dir: Option<PathBuf>,
    /// Upper bound on waiting for a transaction receipt. `None` waits forever.
    pub receipt_timeout: Option<Duration>,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            private_key: ANVIL_PRIVATE_KEY.to_string(),
            address: None,
            solc_version: DEFAULT_SOLC_VERSION.to_string(),
            solc_path: None,
            solc_cache_dir: None,
            receipt_timeout: Some(Duration::from_secs(DEFAULT_RECEIPT_TIMEOUT_SECS)),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Recognized environment variables:
    /// - `ETHEREUM_RPC_URL`: JSON-RPC endpoint (default: local Anvil node)
    /// - `ETHEREUM_PRIVATE_KEY`: signing key (default: Anvil dev account #0)
    /// - `ETHEREUM_ADDRESS`: expected address of the signing key
    /// - `SOLC_VERSION`: default compiler version (default: 0.8.0)
    /// - `SOLC_PATH`: explicit solc binary, skips installation
    /// - `SOLC_CACHE_DIR`: where installed compilers live
    /// - `RECEIPT_TIMEOUT_SECS`: receipt wait bound, 0 disables it (default: 120)
    /// - `LOG_LEVEL`: logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rpc_url = non_empty("ETHEREUM_RPC_URL").unwrap_or(defaults.rpc_url);
        let private_key = non_empty("ETHEREUM_PRIVATE_KEY").unwrap_or(defaults.private_key);
        let address = non_empty("ETHEREUM_ADDRESS");
        let solc_version = non_empty("SOLC_VERSION").unwrap_or(defaults.solc_version);
        let solc_path = non_empty("SOLC_PATH").map(PathBuf::from);
        let solc_cache_dir = non_empty("SOLC_CACHE_DIR").map(PathBuf::from);
        let log_level = non_empty("LOG_LEVEL").unwrap_or(defaults.log_level);

        let receipt_timeout = match non_empty("RECEIPT_TIMEOUT_SECS") {
            None => defaults.receipt_timeout,
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AppError::Config(format!("RECEIPT_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
        };

        Ok(Self {
            rpc_url,
            private_key,
            address,
            solc_version,
            solc_path,
            solc_cache_dir,
            receipt_timeout,
            log_level,
        })
    }
}
