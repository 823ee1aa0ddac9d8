//! SDK configuration.
//!
//! Loaded from a TOML file or built from defaults. The crypto suite is
//! chosen here once and handed to every component that hashes or signs.

use crate::errors::{Result, SdkError};
use corvid_crypto::{CryptoSuite, CryptoSuiteKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default number of blocks a transaction stays valid for.
pub const DEFAULT_BLOCK_LIMIT_WINDOW: u64 = 500;

/// SDK configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SdkConfig {
    /// Chain identity and crypto suite
    pub chain: ChainConfig,
    /// Transaction defaults
    pub transaction: TransactionConfig,
    /// Signing configuration
    pub signer: SignerConfig,
}

impl SdkConfig {
    /// Load configuration from file.
    /// Path is validated to prevent directory traversal attacks.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_path(path)?;

        let contents = std::fs::read_to_string(path).map_err(|e| {
            SdkError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config: SdkConfig = toml::from_str(&contents).map_err(|e| {
            SdkError::Config(format!("Failed to parse config file '{}': {}", path.display(), e))
        })?;
        config.validate()?;

        tracing::debug!(path = %path.display(), suite = %config.chain.suite, "Loaded SDK config");
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_path(path)?;

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| {
            SdkError::Config(format!("Failed to write config file '{}': {}", path.display(), e))
        })
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.chain.chain_id == 0 {
            return Err(SdkError::Config("chain_id cannot be 0".into()));
        }
        if self.transaction.block_limit_window == 0 {
            return Err(SdkError::Config("block_limit_window cannot be 0".into()));
        }
        if self.transaction.gas_limit == 0 {
            return Err(SdkError::Config("gas_limit cannot be 0".into()));
        }
        if self.signer.timeout_ms == 0 {
            return Err(SdkError::Config("signer timeout cannot be 0".into()));
        }
        for endpoint in &self.signer.endpoints {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(SdkError::Config(format!(
                    "signer endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }
        Ok(())
    }

    /// The configured crypto suite.
    pub fn suite(&self) -> CryptoSuite {
        CryptoSuite::new(self.chain.suite)
    }

    pub fn signer_timeout(&self) -> Duration {
        Duration::from_millis(self.signer.timeout_ms)
    }
}

fn check_path(path: &Path) -> Result<()> {
    if path.to_string_lossy().contains("..") {
        return Err(SdkError::Config("Invalid path: directory traversal detected".into()));
    }
    Ok(())
}

/// Chain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Crypto suite (ecdsa|ed25519)
    pub suite: CryptoSuiteKind,
    /// Chain ID
    pub chain_id: u64,
    /// Group ID
    pub group_id: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            suite: CryptoSuiteKind::Ecdsa,
            chain_id: 1,
            group_id: 1,
        }
    }
}

/// Defaults applied by the transaction builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Blocks added to the current height to form `block_limit`
    pub block_limit_window: u64,
    /// Gas price
    pub gas_price: u64,
    /// Gas limit
    pub gas_limit: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            block_limit_window: DEFAULT_BLOCK_LIMIT_WINDOW,
            gas_price: 1,
            gas_limit: 3_000_000,
        }
    }
}

/// Signing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Timeout for remote signing (milliseconds)
    pub timeout_ms: u64,
    /// Remote signing endpoints, raced first-of-N
    pub endpoints: Vec<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            endpoints: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.chain.suite, CryptoSuiteKind::Ecdsa);
        assert_eq!(config.transaction.block_limit_window, 500);
        assert_eq!(config.signer_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[chain]
suite = "ed25519"
chain_id = 20
group_id = 3

[signer]
timeout_ms = 250
endpoints = ["http://127.0.0.1:9000"]
"#
        )
        .unwrap();

        let config = SdkConfig::from_file(file.path()).unwrap();
        assert_eq!(config.suite(), CryptoSuite::ed25519());
        assert_eq!(config.chain.chain_id, 20);
        assert_eq!(config.chain.group_id, 3);
        // unspecified sections keep defaults
        assert_eq!(config.transaction, TransactionConfig::default());
        assert_eq!(config.signer.endpoints.len(), 1);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corvid.toml");

        let mut config = SdkConfig::default();
        config.chain.chain_id = 77;
        config.transaction.block_limit_window = 100;
        config.to_file(&path).unwrap();

        assert_eq!(SdkConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SdkConfig::default();
        config.chain.chain_id = 0;
        assert!(matches!(config.validate(), Err(SdkError::Config(_))));

        let mut config = SdkConfig::default();
        config.signer.endpoints.push("ftp://signer".into());
        assert!(config.validate().is_err());

        assert!(SdkConfig::from_file("../etc/corvid.toml").is_err());
    }
}
