//! Static registry of supported networks

use crate::error::{BridgeError, BridgeResult};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Reference data for one network.
///
/// Serialized camelCase like every other API type; the snake_case names are
/// accepted on input so TOML `[[chains]]` tables keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[serde(alias = "chain_id")]
    pub chain_id: u64,
    pub name: String,
    #[serde(alias = "native_symbol", alias = "symbol")]
    pub native_symbol: String,
    #[serde(alias = "rpc_url")]
    pub rpc_url: String,
    #[serde(alias = "explorer_url")]
    pub explorer_url: String,
    #[serde(default, alias = "is_testnet")]
    pub is_testnet: bool,
}

impl NetworkConfig {
    fn new(
        chain_id: u64,
        name: &str,
        native_symbol: &str,
        rpc_url: &str,
        explorer_url: &str,
        is_testnet: bool,
    ) -> Self {
        Self {
            chain_id,
            name: name.to_string(),
            native_symbol: native_symbol.to_string(),
            rpc_url: rpc_url.to_string(),
            explorer_url: explorer_url.to_string(),
            is_testnet,
        }
    }
}

/// Networks known to the dashboard out of the box
pub fn default_networks() -> Vec<NetworkConfig> {
    vec![
        NetworkConfig::new(1, "Ethereum", "ETH", "https://eth.llamarpc.com", "https://etherscan.io", false),
        NetworkConfig::new(137, "Polygon", "MATIC", "https://polygon-rpc.com", "https://polygonscan.com", false),
        NetworkConfig::new(42161, "Arbitrum One", "ETH", "https://arb1.arbitrum.io/rpc", "https://arbiscan.io", false),
        NetworkConfig::new(10, "Optimism", "ETH", "https://mainnet.optimism.io", "https://optimistic.etherscan.io", false),
        NetworkConfig::new(8453, "Base", "ETH", "https://mainnet.base.org", "https://basescan.org", false),
        NetworkConfig::new(56, "BNB Smart Chain", "BNB", "https://bsc-dataseed.binance.org", "https://bscscan.com", false),
        NetworkConfig::new(43114, "Avalanche C-Chain", "AVAX", "https://api.avax.network/ext/bc/C/rpc", "https://snowtrace.io", false),
        NetworkConfig::new(11155111, "Sepolia", "ETH", "https://rpc.sepolia.org", "https://sepolia.etherscan.io", true),
        NetworkConfig::new(80002, "Polygon Amoy", "MATIC", "https://rpc-amoy.polygon.technology", "https://amoy.polygonscan.com", true),
        NetworkConfig::new(421614, "Arbitrum Sepolia", "ETH", "https://sepolia-rollup.arbitrum.io/rpc", "https://sepolia.arbiscan.io", true),
        NetworkConfig::new(84532, "Base Sepolia", "ETH", "https://sepolia.base.org", "https://sepolia.basescan.org", true),
    ]
}

/// Lookup of supported networks by chain id, loaded once at startup
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    /// Networks in configuration order
    networks: Vec<NetworkConfig>,
    /// Chain id -> index into `networks`
    by_id: HashMap<u64, usize>,
}

impl ChainRegistry {
    /// Build a registry; later duplicates of a chain id are ignored
    pub fn new(networks: Vec<NetworkConfig>) -> Self {
        let mut kept = Vec::with_capacity(networks.len());
        let mut by_id = HashMap::new();

        for network in networks {
            if by_id.contains_key(&network.chain_id) {
                warn!(
                    "Duplicate chain {} ({}) in registry - ignoring",
                    network.chain_id, network.name
                );
                continue;
            }
            by_id.insert(network.chain_id, kept.len());
            kept.push(network);
        }

        debug!("Chain registry loaded with {} networks", kept.len());
        Self {
            networks: kept,
            by_id,
        }
    }

    pub fn get(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.by_id.get(&chain_id).map(|&idx| &self.networks[idx])
    }

    /// Get a network or fail with `ChainNotFound`
    pub fn require(&self, chain_id: u64) -> BridgeResult<&NetworkConfig> {
        self.get(chain_id)
            .ok_or(BridgeError::ChainNotFound { chain_id })
    }

    pub fn is_supported(&self, chain_id: u64) -> bool {
        self.by_id.contains_key(&chain_id)
    }

    pub fn all(&self) -> &[NetworkConfig] {
        &self.networks
    }

    pub fn mainnets(&self) -> Vec<&NetworkConfig> {
        self.networks.iter().filter(|n| !n.is_testnet).collect()
    }

    pub fn testnets(&self) -> Vec<&NetworkConfig> {
        self.networks.iter().filter(|n| n.is_testnet).collect()
    }

    /// Block explorer link for a transaction hash
    pub fn explorer_tx_url(&self, chain_id: u64, tx_hash: &str) -> Option<String> {
        self.get(chain_id).map(|n| {
            format!("{}/tx/{}", n.explorer_url.trim_end_matches('/'), tx_hash)
        })
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new(default_networks())
    }
}
