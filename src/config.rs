//! Relayer configuration
//!
//! Loaded from environment variables (a .env file is honored when present).
//! Secrets never appear in Debug output.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

use eyre::{eyre, Result, WrapErr};
use serde::Deserialize;

/// Main configuration for the relayer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub dest: DestConfig,
    pub account: AccountConfig,
    pub relay: RelayConfig,
    /// Optional address for the /health and /metrics endpoints.
    pub api_addr: Option<SocketAddr>,
}

/// Source chain configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub rpc_url: String,
}

/// Destination chain configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DestConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub bridge_address: String,
}

/// Relayer account configuration. Either a keystore file plus passphrase
/// or a raw private key.
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    pub keystore_path: Option<String>,
    pub keystore_passphrase: Option<String>,
    pub private_key: Option<String>,
}

/// Custom Debug that redacts secrets to prevent accidental log leakage.
impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("keystore_path", &self.keystore_path)
            .field("keystore_passphrase", &"<redacted>")
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Relay engine tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    #[serde(default = "default_confirmation_depth")]
    pub confirmation_depth: u64,
    #[serde(default = "default_verify_signature")]
    pub verify_signature: bool,
    #[serde(default = "default_success_delay")]
    pub success_delay_secs: u64,
    #[serde(default = "default_error_delay")]
    pub error_delay_secs: u64,
    #[serde(default = "default_fork_delay")]
    pub fork_delay_secs: u64,
    #[serde(default = "default_idle_delay")]
    pub idle_delay_secs: u64,
    #[serde(default = "default_stall_timeout")]
    pub stall_timeout_secs: u64,
}

/// Default functions
fn default_batch_size() -> u64 {
    90
}

fn default_confirmation_depth() -> u64 {
    2
}

fn default_verify_signature() -> bool {
    true
}

fn default_success_delay() -> u64 {
    15
}

fn default_error_delay() -> u64 {
    10
}

fn default_fork_delay() -> u64 {
    300
}

fn default_idle_delay() -> u64 {
    15
}

fn default_stall_timeout() -> u64 {
    86400
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads a .env file if present, then reads from the environment.
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    fn load_from_env() -> Result<Self> {
        let source = SourceConfig {
            rpc_url: env::var("SOURCE_RPC_URL")
                .map_err(|_| eyre!("SOURCE_RPC_URL environment variable is required"))?,
        };

        let dest = DestConfig {
            rpc_url: env::var("DEST_RPC_URL")
                .map_err(|_| eyre!("DEST_RPC_URL environment variable is required"))?,
            chain_id: env::var("DEST_CHAIN_ID")
                .map_err(|_| eyre!("DEST_CHAIN_ID environment variable is required"))?
                .parse()
                .wrap_err("DEST_CHAIN_ID must be a valid u64")?,
            bridge_address: env::var("BRIDGE_ADDRESS")
                .map_err(|_| eyre!("BRIDGE_ADDRESS environment variable is required"))?,
        };

        let account = AccountConfig {
            keystore_path: env::var("KEYSTORE_PATH").ok(),
            keystore_passphrase: env::var("KEYSTORE_PASSPHRASE").ok(),
            private_key: env::var("RELAYER_PRIVATE_KEY").ok(),
        };

        let relay = RelayConfig {
            batch_size: env_or("BATCH_SIZE", default_batch_size()),
            confirmation_depth: env_or("CONFIRMATION_DEPTH", default_confirmation_depth()),
            verify_signature: env_or("VERIFY_SIGNATURE", default_verify_signature()),
            success_delay_secs: env_or("SUCCESS_DELAY_SECS", default_success_delay()),
            error_delay_secs: env_or("ERROR_DELAY_SECS", default_error_delay()),
            fork_delay_secs: env_or("FORK_DELAY_SECS", default_fork_delay()),
            idle_delay_secs: env_or("IDLE_DELAY_SECS", default_idle_delay()),
            stall_timeout_secs: env_or("STALL_TIMEOUT_SECS", default_stall_timeout()),
        };

        let api_addr = env::var("API_ADDR").ok().and_then(|v| v.parse().ok());

        let config = Config {
            source,
            dest,
            account,
            relay,
            api_addr,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.source.rpc_url.is_empty() {
            return Err(eyre!("source.rpc_url cannot be empty"));
        }

        if self.dest.rpc_url.is_empty() {
            return Err(eyre!("dest.rpc_url cannot be empty"));
        }

        if self.dest.bridge_address.len() != 42 || !self.dest.bridge_address.starts_with("0x") {
            return Err(eyre!(
                "dest.bridge_address must be a valid hex address (42 chars with 0x prefix)"
            ));
        }

        match (&self.account.private_key, &self.account.keystore_path) {
            (Some(key), _) => {
                if key.len() != 66 || !key.starts_with("0x") {
                    return Err(eyre!(
                        "account.private_key must be 66 chars (0x + 64 hex chars)"
                    ));
                }
            }
            (None, Some(path)) => {
                if path.is_empty() {
                    return Err(eyre!("account.keystore_path cannot be empty"));
                }
                if self.account.keystore_passphrase.is_none() {
                    return Err(eyre!(
                        "KEYSTORE_PASSPHRASE is required when using a keystore"
                    ));
                }
            }
            (None, None) => {
                return Err(eyre!(
                    "either RELAYER_PRIVATE_KEY or KEYSTORE_PATH must be set"
                ));
            }
        }

        if self.relay.batch_size == 0 {
            return Err(eyre!("relay.batch_size must be at least 1"));
        }

        if self.relay.stall_timeout_secs == 0 {
            return Err(eyre!("relay.stall_timeout_secs must be positive"));
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            source: SourceConfig {
                rpc_url: "http://localhost:19086".to_string(),
            },
            dest: DestConfig {
                rpc_url: "http://localhost:8545".to_string(),
                chain_id: 31337,
                bridge_address: "0x0000000000000000000000000000000000000001".to_string(),
            },
            account: AccountConfig {
                keystore_path: None,
                keystore_passphrase: None,
                private_key: Some(
                    "0x0000000000000000000000000000000000000000000000000000000000000001"
                        .to_string(),
                ),
            },
            relay: RelayConfig {
                batch_size: default_batch_size(),
                confirmation_depth: default_confirmation_depth(),
                verify_signature: true,
                success_delay_secs: default_success_delay(),
                error_delay_secs: default_error_delay(),
                fork_delay_secs: default_fork_delay(),
                idle_delay_secs: default_idle_delay(),
                stall_timeout_secs: default_stall_timeout(),
            },
            api_addr: None,
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_batch_size(), 90);
        assert_eq!(default_confirmation_depth(), 2);
        assert!(default_verify_signature());
        assert_eq!(default_success_delay(), 15);
        assert_eq!(default_error_delay(), 10);
        assert_eq!(default_fork_delay(), 300);
        assert_eq!(default_stall_timeout(), 86400);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_bridge_address_validation() {
        let mut config = valid_config();
        config.dest.bridge_address = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_private_key_length_validation() {
        let mut config = valid_config();
        config.account.private_key = Some("0x123".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_account_requires_key_or_keystore() {
        let mut config = valid_config();
        config.account.private_key = None;
        assert!(config.validate().is_err());

        config.account.keystore_path = Some("/var/relayer/keystore.json".to_string());
        // Keystore without passphrase is rejected.
        assert!(config.validate().is_err());

        config.account.keystore_passphrase = Some("hunter2".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = valid_config();
        config.relay.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_account_debug_redacts_secrets() {
        let config = valid_config();
        let debug = format!("{:?}", config.account);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("0000000000000001"));
    }
}
