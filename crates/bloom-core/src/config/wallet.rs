//! Agent wallet configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Network the agent wallets live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    #[default]
    BaseMainnet,
    BaseSepolia,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::BaseMainnet => "base-mainnet",
            Network::BaseSepolia => "base-sepolia",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "base-mainnet" => Ok(Network::BaseMainnet),
            "base-sepolia" => Ok(Network::BaseSepolia),
            other => Err(format!(
                "unknown network '{}' (expected base-mainnet or base-sepolia)",
                other
            )),
        }
    }
}

/// Configuration for agent wallets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Directory holding `user-wallets.json`.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Network for newly created wallets.
    #[serde(default)]
    pub network: Network,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            network: Network::default(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".wallet-storage")
}
