//! Network names, chain identifiers and fullnode endpoints.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

const MAINNET_RPC: &str = "https://fullnode.mainnet.sui.io:443";
const TESTNET_RPC: &str = "https://fullnode.testnet.sui.io:443";
const DEVNET_RPC: &str = "https://fullnode.devnet.sui.io:443";
const LOCALNET_RPC: &str = "http://127.0.0.1:9000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Localnet => "localnet",
        }
    }

    /// Wallet-standard chain identifier, e.g. `sui:testnet`.
    pub fn chain_id(&self) -> String {
        format!("sui:{}", self.name())
    }

    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_RPC,
            Network::Testnet => TESTNET_RPC,
            Network::Devnet => DEVNET_RPC,
            Network::Localnet => LOCALNET_RPC,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        network_from_identifier(s).ok_or_else(|| {
            anyhow!(
                "unknown network '{}': expected mainnet, testnet, devnet or localnet",
                s
            )
        })
    }
}

/// Resolve a network from a name or a chain identifier (`testnet`,
/// `sui:testnet`, `SUI:TESTNET`).
pub fn network_from_identifier(ident: &str) -> Option<Network> {
    let lower = ident.trim().to_lowercase();
    let name = lower.strip_prefix("sui:").unwrap_or(&lower);
    match name {
        "mainnet" => Some(Network::Mainnet),
        "testnet" => Some(Network::Testnet),
        "devnet" => Some(Network::Devnet),
        "localnet" => Some(Network::Localnet),
        _ => None,
    }
}

pub fn infer_network_from_url(url: &str) -> Option<Network> {
    let lower = url.to_lowercase();
    if lower.contains("testnet") {
        Some(Network::Testnet)
    } else if lower.contains("devnet") {
        Some(Network::Devnet)
    } else if lower.contains("mainnet") {
        Some(Network::Mainnet)
    } else if lower.contains("127.0.0.1") || lower.contains("localhost") {
        Some(Network::Localnet)
    } else {
        None
    }
}

/// The network the application expects wallets to be on.
///
/// This is the network-info provider consulted whenever a wallet needs an
/// explicit chain identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub network: Network,
    pub chain_id: String,
    pub rpc_url: String,
}

impl NetworkInfo {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            chain_id: network.chain_id(),
            rpc_url: network.default_rpc_url().to_string(),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: &str) -> Self {
        self.rpc_url = rpc_url.to_string();
        self
    }

    pub fn name(&self) -> &'static str {
        self.network.name()
    }

    /// Whether a wallet-reported chain identifier names this network.
    pub fn matches_chain(&self, chain: &str) -> bool {
        network_from_identifier(chain) == Some(self.network)
    }
}

impl Default for NetworkInfo {
    /// Pinned to testnet.
    fn default() -> Self {
        Self::new(Network::Testnet)
    }
}
