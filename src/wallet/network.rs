//! Wallet network detection and best-effort switching.

use serde::Serialize;
use tracing::{debug, info};

use sui_subscriptions_transport::NetworkInfo;

use super::handle::WalletHandle;

/// Switch entry points, tried in this order.
pub const KNOWN_SWITCH_METHODS: &[&str] = &[
    "sui:switchChain",
    "switchChain",
    "switchNetwork",
    "setNetwork",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub detected_chain_id: Option<String>,
    pub is_expected_network: bool,
}

/// Compare the chain the wallet reports with the expected one. A wallet that
/// reports no chain is assumed to be on the expected network.
pub fn detect_network(wallet: &WalletHandle, expected: &NetworkInfo) -> NetworkStatus {
    let detected = wallet.chain.clone().filter(|c| !c.trim().is_empty());
    let is_expected_network = detected
        .as_deref()
        .map(|c| expected.matches_chain(c))
        .unwrap_or(true);
    NetworkStatus {
        detected_chain_id: detected,
        is_expected_network,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SwitchOutcome {
    Switched { method: String },
    /// No method worked; the user has to switch by hand.
    Manual { instructions: String },
}

pub fn manual_switch_instructions(wallet_name: &str, expected: &NetworkInfo) -> String {
    format!(
        "Open {} settings, choose the {} network ({}), then reconnect.",
        if wallet_name.is_empty() { "your wallet" } else { wallet_name },
        expected.name(),
        expected.chain_id
    )
}

/// Ask the wallet to move to `expected`, trying each known switch method.
pub async fn attempt_network_switch(wallet: &WalletHandle, expected: &NetworkInfo) -> SwitchOutcome {
    for method in KNOWN_SWITCH_METHODS {
        let Some(switcher) = wallet.network_switcher(method) else {
            continue;
        };
        match switcher.switch_network(&expected.chain_id).await {
            Ok(()) => {
                info!(wallet = %wallet.name, method = *method, chain = %expected.chain_id, "wallet switched network");
                return SwitchOutcome::Switched {
                    method: method.to_string(),
                };
            }
            Err(err) => debug!(wallet = %wallet.name, method = *method, error = %err, "network switch failed"),
        }
    }
    SwitchOutcome::Manual {
        instructions: manual_switch_instructions(&wallet.name, expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::handle::{SwitchNetwork, WalletCallError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use sui_subscriptions_transport::Network;

    struct Switcher(bool);

    #[async_trait]
    impl SwitchNetwork for Switcher {
        async fn switch_network(&self, _chain: &str) -> Result<(), WalletCallError> {
            if self.0 {
                Ok(())
            } else {
                Err(WalletCallError::new("not supported"))
            }
        }
    }

    #[test]
    fn test_detect_network() {
        let expected = NetworkInfo::default();
        let on_main = WalletHandle::new("w").with_chain("sui:mainnet");
        assert!(!detect_network(&on_main, &expected).is_expected_network);

        let on_test = WalletHandle::new("w").with_chain("sui:testnet");
        assert!(detect_network(&on_test, &expected).is_expected_network);

        let unknown = WalletHandle::new("w");
        let status = detect_network(&unknown, &expected);
        assert!(status.is_expected_network);
        assert_eq!(status.detected_chain_id, None);
    }

    #[tokio::test]
    async fn test_switch_tries_methods_in_order() {
        let wallet = WalletHandle::new("w")
            .with_network_switch("switchNetwork", Arc::new(Switcher(true)))
            .with_network_switch("switchChain", Arc::new(Switcher(false)));
        let outcome = attempt_network_switch(&wallet, &NetworkInfo::default()).await;
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                method: "switchNetwork".into()
            }
        );
    }

    #[tokio::test]
    async fn test_switch_falls_back_to_manual() {
        let wallet = WalletHandle::new("Suiet");
        let expected = NetworkInfo::new(Network::Mainnet);
        match attempt_network_switch(&wallet, &expected).await {
            SwitchOutcome::Manual { instructions } => {
                assert!(instructions.contains("Suiet"));
                assert!(instructions.contains("sui:mainnet"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
