//! Ready-made wallets, stores, and services.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use sui_subscriptions::connection::ConnectionStore;
use sui_subscriptions::storage::{MemoryStorage, TransactionHistory};
use sui_subscriptions::wallet::{TransactionExecutor, WalletFeature, WalletHandle};
use sui_subscriptions::SubscriptionService;
use sui_subscriptions_transport::test_utils::MockChainClient;
use sui_subscriptions_transport::NetworkInfo;
use sui_subscriptions_types::ConfirmationSchedule;

use super::mocks::{MockExecutor, MockSignAndExecute, MockSigner, RecordingReloader};

pub const PACKAGE: &str = "0x177d14d5f5ac73f35fef5c9667566a0d8947386b59c93f1aa3219299e68ba381";
pub const SUBSCRIBER: &str = "0x00000000000000000000000000000000000000000000000000000000000a11ce";

/// A wallet with only `signAndExecuteTransactionBlock`.
pub fn standard_wallet(name: &str, address: &str, response: Value) -> (WalletHandle, Arc<MockSignAndExecute>) {
    let imp = MockSignAndExecute::ok(response);
    let wallet = WalletHandle::new(name)
        .with_account(address)
        .with_chain("sui:testnet")
        .with_sign_and_execute(imp.clone());
    (wallet, imp)
}

/// A wallet with accounts but no signing entry point.
pub fn bare_wallet(address: &str) -> WalletHandle {
    WalletHandle::new("Bare Wallet")
        .with_account(address)
        .with_feature("standard:connect", WalletFeature::Other)
}

/// A Slush-style wallet exposing feature-flag sign and execute.
pub fn slush_wallet(address: &str, execute_response: Value) -> (WalletHandle, Arc<MockSigner>, Arc<MockExecutor>) {
    let signer = MockSigner::new();
    let executor = MockExecutor::new(execute_response);
    let wallet = WalletHandle::new("Slush")
        .with_account(address)
        .with_feature_sign(signer.clone())
        .with_feature_execute(executor.clone());
    (wallet, signer, executor)
}

pub fn new_store(window: Duration) -> (ConnectionStore, Arc<MemoryStorage>, Arc<RecordingReloader>) {
    let storage = Arc::new(MemoryStorage::new());
    let reloader = Arc::new(RecordingReloader::default());
    let store = ConnectionStore::new(storage.clone(), NetworkInfo::default(), window)
        .with_reloader(reloader.clone());
    (store, storage, reloader)
}

pub fn fast_schedule() -> ConfirmationSchedule {
    ConfirmationSchedule {
        delays: vec![Duration::from_millis(5), Duration::from_millis(10)],
    }
}

pub fn new_service() -> (SubscriptionService, Arc<MockChainClient>, Arc<MemoryStorage>) {
    let client = Arc::new(MockChainClient::new());
    let storage = Arc::new(MemoryStorage::new());
    let service = SubscriptionService::new(
        client.clone(),
        TransactionExecutor::new(NetworkInfo::default()),
        TransactionHistory::new(storage.clone()),
        PACKAGE,
    )
    .with_schedule(fast_schedule());
    (service, client, storage)
}
