//! Network and deployment configuration.
//!
//! Configuration is layered with figment: built-in defaults, then an optional
//! TOML file, then `DEVNET_`-prefixed environment variables (nested keys are
//! separated by `__`, e.g. `DEVNET_NETWORKS__LOCALHOST__URL`).

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Devnet.toml";

/// Prefix for environment variables layered over the configuration file.
pub const ENV_PREFIX: &str = "DEVNET_";

/// RPC URL of the built-in local networks.
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";

/// Default gas price for the deposit contract deployment (20 gwei).
pub const DEFAULT_GAS_PRICE: u64 = 20_000_000_000;

/// Default gas limit for the deposit contract deployment.
pub const DEFAULT_DEPOSIT_GAS_LIMIT: u64 = 8_000_000;

/// The network a run is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Name of the network, as selected by the user.
    pub name: String,
    /// JSON-RPC endpoint of the network.
    pub url: Url,
}

/// A network entry in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub url: String,
}

/// Parameters of the deployment sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// JSON ABI of the beacon deposit contract.
    pub deposit_abi: PathBuf,
    /// Hex bytecode of the beacon deposit contract.
    pub deposit_bin: PathBuf,
    /// Hardhat artifacts directory holding the multicall and balance batcher builds.
    pub artifacts_dir: PathBuf,
    /// Artifact name of the multicall aggregator.
    pub multicall_contract: String,
    /// Artifact name of the balance batcher.
    pub balance_batcher_contract: String,
    /// Node account index sending the deposit contract deployment.
    pub deposit_sender_index: usize,
    /// Node account index sending the remaining deployments.
    pub sender_index: usize,
    /// Gas price (wei) of the deposit contract deployment.
    pub gas_price: u64,
    /// Gas limit of the deposit contract deployment.
    pub deposit_gas_limit: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            deposit_abi: PathBuf::from("./contracts/Deposit.abi"),
            deposit_bin: PathBuf::from("./contracts/Deposit.bin"),
            artifacts_dir: PathBuf::from("./artifacts"),
            multicall_contract: "Multicall2".to_string(),
            balance_batcher_contract: "BalanceChecker".to_string(),
            deposit_sender_index: 0,
            sender_index: 1,
            gas_price: DEFAULT_GAS_PRICE,
            deposit_gas_limit: DEFAULT_DEPOSIT_GAS_LIMIT,
        }
    }
}

/// Top-level configuration: known networks plus deployment parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevnetConfig {
    pub networks: BTreeMap<String, NetworkEntry>,
    pub deploy: DeployConfig,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        let local = NetworkEntry {
            url: LOCAL_RPC_URL.to_string(),
        };

        Self {
            networks: BTreeMap::from([
                ("hardhat".to_string(), local.clone()),
                ("localhost".to_string(), local),
            ]),
            deploy: DeployConfig::default(),
        }
    }
}

impl DevnetConfig {
    /// Load the configuration.
    ///
    /// An explicitly given file must exist. Without one, `Devnet.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file not found: {}", path.display());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let default_path = PathBuf::from(CONFIG_FILENAME);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .context("Failed to parse devnet configuration")?;
        tracing::debug!(networks = ?config.networks.keys().collect::<Vec<_>>(), "Configuration loaded");
        Ok(config)
    }

    /// Resolve the named network, optionally overriding its RPC URL.
    ///
    /// The network must be declared even when an override URL is given.
    pub fn network(&self, name: &str, rpc_url: Option<&str>) -> Result<NetworkConfig> {
        let Some(entry) = self.networks.get(name) else {
            let known = self.networks.keys().cloned().collect::<Vec<_>>().join(", ");
            anyhow::bail!("Unknown network {} (known networks: {})", name, known);
        };

        let raw_url = rpc_url.unwrap_or(entry.url.as_str());

        let url = Url::parse(raw_url)
            .with_context(|| format!("Invalid RPC URL for network {}: {}", name, raw_url))?;

        Ok(NetworkConfig {
            name: name.to_string(),
            url,
        })
    }
}
