//! Runtime configuration.
//!
//! Values come from the environment and can be overridden by CLI flags:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `SUI_NETWORK` | `testnet` |
//! | `SUI_RPC_URL` | the network's public fullnode |
//! | `SUBSCRIPTIONS_PACKAGE_ID` | deployed testnet package |
//! | `SUBSCRIPTIONS_REGISTRY_ID` | deployed testnet registry |
//! | `SUBSCRIPTIONS_STORAGE_PATH` | `~/.sui-subscriptions/storage.json` |
//! | `WALLET_RELOAD_DEBOUNCE_MS` | 1000 |
//! | `CONFIRMATION_SHORT_DELAY_MS` | 2000 |
//! | `CONFIRMATION_LONG_DELAY_MS` | 5000 |

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Duration;

use sui_subscriptions_transport::{Network, NetworkInfo};
use sui_subscriptions_types::{
    env_millis_or, env_string_or, env_var, normalize_address_checked, ConfirmationSchedule,
};

pub const DEFAULT_PACKAGE_ID: &str =
    "0x177d14d5f5ac73f35fef5c9667566a0d8947386b59c93f1aa3219299e68ba381";
pub const DEFAULT_REGISTRY_ID: &str =
    "0x1c94bd91d5b1cda4988e91b2e11b01af59858e2d286076b2bd08a9568d754c43";

const DEFAULT_RELOAD_DEBOUNCE_MS: u64 = 1_000;
const DEFAULT_SHORT_DELAY_MS: u64 = 2_000;
const DEFAULT_LONG_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub network: NetworkInfo,
    pub package_id: String,
    pub registry_id: String,
    pub storage_path: PathBuf,
    pub reload_debounce: Duration,
    pub confirmation: ConfirmationSchedule,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkInfo::default(),
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            registry_id: DEFAULT_REGISTRY_ID.to_string(),
            storage_path: default_storage_path(),
            reload_debounce: Duration::from_millis(DEFAULT_RELOAD_DEBOUNCE_MS),
            confirmation: ConfirmationSchedule::new(DEFAULT_SHORT_DELAY_MS, DEFAULT_LONG_DELAY_MS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let network = match env_var::<String>("SUI_NETWORK") {
            Some(name) => name.parse::<Network>()?,
            None => Network::Testnet,
        };
        let mut info = NetworkInfo::new(network);
        if let Some(url) = env_var::<String>("SUI_RPC_URL") {
            info = info.with_rpc_url(&url);
        }

        let package_id = env_string_or("SUBSCRIPTIONS_PACKAGE_ID", DEFAULT_PACKAGE_ID);
        let registry_id = env_string_or("SUBSCRIPTIONS_REGISTRY_ID", DEFAULT_REGISTRY_ID);
        check_object_id("SUBSCRIPTIONS_PACKAGE_ID", &package_id)?;
        check_object_id("SUBSCRIPTIONS_REGISTRY_ID", &registry_id)?;

        let short = env_millis_or("CONFIRMATION_SHORT_DELAY_MS", DEFAULT_SHORT_DELAY_MS);
        let long = env_millis_or("CONFIRMATION_LONG_DELAY_MS", DEFAULT_LONG_DELAY_MS);

        Ok(Self {
            network: info,
            package_id,
            registry_id,
            storage_path: env_var::<PathBuf>("SUBSCRIPTIONS_STORAGE_PATH")
                .unwrap_or_else(default_storage_path),
            reload_debounce: env_millis_or("WALLET_RELOAD_DEBOUNCE_MS", DEFAULT_RELOAD_DEBOUNCE_MS),
            confirmation: ConfirmationSchedule {
                delays: vec![short, long],
            },
        })
    }

    /// Apply CLI overrides. The RPC URL resets to the network default when
    /// only the network changes.
    pub fn with_overrides(
        mut self,
        network: Option<Network>,
        rpc_url: Option<&str>,
        storage: Option<PathBuf>,
    ) -> Self {
        if let Some(network) = network {
            if network != self.network.network {
                self.network = NetworkInfo::new(network);
            }
        }
        if let Some(url) = rpc_url {
            self.network = self.network.clone().with_rpc_url(url);
        }
        if let Some(path) = storage {
            self.storage_path = path;
        }
        self
    }
}

fn check_object_id(var: &str, value: &str) -> Result<()> {
    normalize_address_checked(value)
        .map(|_| ())
        .ok_or_else(|| anyhow!("{} is not a valid object id: {}", var, value))
}

pub fn default_storage_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sui-subscriptions")
        .join("storage.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.network.chain_id, "sui:testnet");
        assert_eq!(config.package_id, DEFAULT_PACKAGE_ID);
        assert_eq!(config.reload_debounce, Duration::from_millis(1_000));
        assert_eq!(config.confirmation.attempts(), 3);
        assert!(config.storage_path.ends_with(".sui-subscriptions/storage.json"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(Network::Mainnet),
            None,
            Some(PathBuf::from("/tmp/s.json")),
        );
        assert_eq!(config.network.chain_id, "sui:mainnet");
        assert_eq!(config.network.rpc_url, Network::Mainnet.default_rpc_url());
        assert_eq!(config.storage_path, PathBuf::from("/tmp/s.json"));

        let config = config.with_overrides(None, Some("http://127.0.0.1:9000"), None);
        assert_eq!(config.network.network, Network::Mainnet);
        assert_eq!(config.network.rpc_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_check_object_id() {
        assert!(check_object_id("X", DEFAULT_REGISTRY_ID).is_ok());
        assert!(check_object_id("X", "registry").is_err());
    }
}
