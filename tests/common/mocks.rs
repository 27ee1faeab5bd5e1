//! Mock wallet entry points and collaborators.
//!
//! Each mock records its inputs so tests can check which path a dispatch
//! took and with which arguments.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Notify;

use sui_subscriptions::connection::{ReloadReason, ViewReloader};
use sui_subscriptions::storage::KeyValueStore;
use sui_subscriptions::wallet::{
    ExecuteInput, ExecuteTransaction, SignAndExecute, SignAndExecuteInput, SignInput, SignTransaction,
    WalletCallError,
};

pub struct MockSignAndExecute {
    response: Mutex<Result<Value, WalletCallError>>,
    pub calls: Mutex<Vec<SignAndExecuteInput>>,
    /// When set, each call waits for one notification before answering.
    gate: Option<Arc<Notify>>,
}

impl MockSignAndExecute {
    pub fn ok(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(response)),
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn failing(err: WalletCallError) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Err(err)),
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn gated(response: Value, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(response)),
            calls: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl SignAndExecute for MockSignAndExecute {
    async fn sign_and_execute(&self, input: SignAndExecuteInput) -> Result<Value, WalletCallError> {
        self.calls.lock().push(input);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.lock().clone()
    }
}

pub struct MockSigner {
    pub calls: Mutex<Vec<SignInput>>,
}

impl MockSigner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl SignTransaction for MockSigner {
    async fn sign_transaction(&self, input: SignInput) -> Result<Value, WalletCallError> {
        self.calls.lock().push(input);
        Ok(json!({ "bytes": "AAECAw==", "signature": "c2lnbmF0dXJl" }))
    }
}

pub struct MockExecutor {
    response: Value,
    pub calls: Mutex<Vec<ExecuteInput>>,
}

impl MockExecutor {
    pub fn new(response: Value) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ExecuteTransaction for MockExecutor {
    async fn execute_transaction(&self, input: ExecuteInput) -> Result<Value, WalletCallError> {
        self.calls.lock().push(input);
        Ok(self.response.clone())
    }
}

#[derive(Default)]
pub struct RecordingReloader {
    pub reloads: Mutex<Vec<ReloadReason>>,
}

impl RecordingReloader {
    pub fn count(&self) -> usize {
        self.reloads.lock().len()
    }
}

impl ViewReloader for RecordingReloader {
    fn reload(&self, reason: ReloadReason) {
        self.reloads.lock().push(reason);
    }
}

/// Storage where every operation fails.
pub struct FailingStorage;

impl KeyValueStore for FailingStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("storage unavailable"))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }
}
