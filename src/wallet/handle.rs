//! Wallet handle model.
//!
//! Browser wallets expose their signing entry points in several shapes. A
//! [`WalletHandle`] records which of those shapes a given wallet has, as a
//! closed set of optional capability slots, each backed by a trait object:
//!
//! | Slot | Wallet-standard name |
//! |------|----------------------|
//! | `sign_and_execute` | `signAndExecuteTransactionBlock` |
//! | `features[FEATURE_SIGN_TRANSACTION]` | `sui:signTransactionBlock` |
//! | `features[FEATURE_EXECUTE_TRANSACTION]` | `sui:executeTransactionBlock` |
//! | `adapter` | `adapter.signAndExecuteTransactionBlock` |
//! | `sign` | `signTransactionBlock` |
//! | `network_switch` | `switchChain`, `switchNetwork`, ... |

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sui_subscriptions_types::{ResultOptions, SignedTransaction, TransactionRequest};

pub const FEATURE_SIGN_TRANSACTION: &str = "sui:signTransactionBlock";
pub const FEATURE_EXECUTE_TRANSACTION: &str = "sui:executeTransactionBlock";

pub const METHOD_SIGN_AND_EXECUTE: &str = "signAndExecuteTransactionBlock";
pub const METHOD_ADAPTER_SIGN_AND_EXECUTE: &str = "adapter.signAndExecuteTransactionBlock";
pub const METHOD_SIGN: &str = "signTransactionBlock";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
    pub public_key: Option<String>,
}

impl WalletAccount {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            public_key: None,
        }
    }
}

/// Error raised by a wallet call, as the wallet reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletCallError {
    pub message: String,
    /// Structured vendor code, when the wallet provides one.
    pub code: Option<i64>,
    pub data: Option<Value>,
}

impl WalletCallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            data: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl fmt::Display for WalletCallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for WalletCallError {}

/// Input of a sign-and-execute call (standard or adapter).
#[derive(Debug, Clone)]
pub struct SignAndExecuteInput {
    pub request: TransactionRequest,
    pub account: WalletAccount,
    /// Only set for wallets that need the chain spelled out.
    pub chain: Option<String>,
    pub options: ResultOptions,
}

/// Input of a sign-only call.
#[derive(Debug, Clone)]
pub struct SignInput {
    pub request: TransactionRequest,
    pub account: WalletAccount,
    pub chain: Option<String>,
}

/// How long `executeTransactionBlock` waits before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecuteRequestType {
    WaitForEffectsCert,
    WaitForLocalExecution,
}

/// Input of the feature-flag execute call: previously signed bytes.
#[derive(Debug, Clone)]
pub struct ExecuteInput {
    pub signed: SignedTransaction,
    pub public_key: Option<String>,
    pub request_type: ExecuteRequestType,
    pub options: ResultOptions,
}

#[async_trait]
pub trait SignAndExecute: Send + Sync {
    async fn sign_and_execute(&self, input: SignAndExecuteInput) -> Result<Value, WalletCallError>;
}

/// Returns the raw wallet response, which carries `bytes` and `signature`.
#[async_trait]
pub trait SignTransaction: Send + Sync {
    async fn sign_transaction(&self, input: SignInput) -> Result<Value, WalletCallError>;
}

#[async_trait]
pub trait ExecuteTransaction: Send + Sync {
    async fn execute_transaction(&self, input: ExecuteInput) -> Result<Value, WalletCallError>;
}

#[async_trait]
pub trait SwitchNetwork: Send + Sync {
    async fn switch_network(&self, chain: &str) -> Result<(), WalletCallError>;
}

/// Entry of a wallet's `features` map.
#[derive(Clone)]
pub enum WalletFeature {
    SignTransaction(Arc<dyn SignTransaction>),
    ExecuteTransaction(Arc<dyn ExecuteTransaction>),
    /// Present but not used for signing (e.g. `standard:connect`).
    Other,
}

/// Runtime shape of a connected (or connecting) wallet.
#[derive(Clone, Default)]
pub struct WalletHandle {
    /// Self-reported display name.
    pub name: String,
    pub accounts: Vec<WalletAccount>,
    /// Chain the wallet reports being on, if any.
    pub chain: Option<String>,
    pub sign_and_execute: Option<Arc<dyn SignAndExecute>>,
    pub features: BTreeMap<String, WalletFeature>,
    pub adapter: Option<Arc<dyn SignAndExecute>>,
    pub sign: Option<Arc<dyn SignTransaction>>,
    pub network_switch: Vec<(String, Arc<dyn SwitchNetwork>)>,
}

impl WalletHandle {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_account(mut self, address: &str) -> Self {
        self.accounts.push(WalletAccount::new(address));
        self
    }

    pub fn with_accounts(mut self, accounts: Vec<WalletAccount>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_chain(mut self, chain: &str) -> Self {
        self.chain = Some(chain.to_string());
        self
    }

    pub fn with_sign_and_execute(mut self, imp: Arc<dyn SignAndExecute>) -> Self {
        self.sign_and_execute = Some(imp);
        self
    }

    pub fn with_feature_sign(mut self, imp: Arc<dyn SignTransaction>) -> Self {
        self.features.insert(
            FEATURE_SIGN_TRANSACTION.to_string(),
            WalletFeature::SignTransaction(imp),
        );
        self
    }

    pub fn with_feature_execute(mut self, imp: Arc<dyn ExecuteTransaction>) -> Self {
        self.features.insert(
            FEATURE_EXECUTE_TRANSACTION.to_string(),
            WalletFeature::ExecuteTransaction(imp),
        );
        self
    }

    pub fn with_feature(mut self, name: &str, feature: WalletFeature) -> Self {
        self.features.insert(name.to_string(), feature);
        self
    }

    pub fn with_adapter(mut self, imp: Arc<dyn SignAndExecute>) -> Self {
        self.adapter = Some(imp);
        self
    }

    pub fn with_sign(mut self, imp: Arc<dyn SignTransaction>) -> Self {
        self.sign = Some(imp);
        self
    }

    pub fn with_network_switch(mut self, method: &str, imp: Arc<dyn SwitchNetwork>) -> Self {
        self.network_switch.push((method.to_string(), imp));
        self
    }

    pub fn primary_account(&self) -> Option<&WalletAccount> {
        self.accounts.first()
    }

    pub fn feature_sign(&self) -> Option<&Arc<dyn SignTransaction>> {
        match self.features.get(FEATURE_SIGN_TRANSACTION) {
            Some(WalletFeature::SignTransaction(imp)) => Some(imp),
            _ => None,
        }
    }

    pub fn feature_execute(&self) -> Option<&Arc<dyn ExecuteTransaction>> {
        match self.features.get(FEATURE_EXECUTE_TRANSACTION) {
            Some(WalletFeature::ExecuteTransaction(imp)) => Some(imp),
            _ => None,
        }
    }

    pub fn network_switcher(&self, method: &str) -> Option<&Arc<dyn SwitchNetwork>> {
        self.network_switch
            .iter()
            .find(|(name, _)| name == method)
            .map(|(_, imp)| imp)
    }

    /// Names of every entry point present, for diagnostics.
    pub fn method_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.sign_and_execute.is_some() {
            names.push(METHOD_SIGN_AND_EXECUTE.to_string());
        }
        for key in self.features.keys() {
            names.push(format!("features[{}]", key));
        }
        if self.adapter.is_some() {
            names.push(METHOD_ADAPTER_SIGN_AND_EXECUTE.to_string());
        }
        if self.sign.is_some() {
            names.push(METHOD_SIGN.to_string());
        }
        names.extend(self.network_switch.iter().map(|(name, _)| name.clone()));
        names
    }
}

impl fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletHandle")
            .field("name", &self.name)
            .field("accounts", &self.accounts)
            .field("chain", &self.chain)
            .field("methods", &self.method_names())
            .finish()
    }
}
