//! CLI subcommand implementations for sui-subscriptions

pub mod history;
pub mod output;
pub mod query;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use sui_subscriptions::{AppConfig, FileStorage, SubscriptionService, TransactionExecutor, TransactionHistory};
use sui_subscriptions_transport::{ChainClient, JsonRpcClient};

/// Everything a subcommand needs.
pub struct CliContext {
    pub config: AppConfig,
    pub service: SubscriptionService,
    pub json: bool,
}

impl CliContext {
    pub fn new(config: AppConfig, json: bool) -> Result<Self> {
        debug!(
            network = config.network.name(),
            rpc = %config.network.rpc_url,
            storage = %config.storage_path.display(),
            "cli configuration"
        );
        let client: Arc<dyn ChainClient> = Arc::new(JsonRpcClient::new(&config.network.rpc_url));
        let storage = Arc::new(FileStorage::open(&config.storage_path)?);
        let service = SubscriptionService::new(
            client,
            TransactionExecutor::new(config.network.clone()),
            TransactionHistory::new(storage),
            &config.package_id,
        )
        .with_schedule(config.confirmation.clone());
        Ok(Self {
            config,
            service,
            json,
        })
    }

    pub fn history(&self) -> &TransactionHistory {
        self.service.history()
    }
}
