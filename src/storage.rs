//! Durable key/value storage and the transaction history lists.
//!
//! Values are strings, mirroring browser local storage. The connection store
//! owns the `wallet*` keys; [`TransactionHistory`] owns the two JSON list
//! keys. Storage failures are logged and otherwise ignored by callers.
//!
//! # Usage
//!
//! ```ignore
//! let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::open("storage.json")?);
//! let history = TransactionHistory::new(storage);
//! history.record_transaction("0xabc");
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub const KEY_WALLET_CONNECTED: &str = "walletConnected";
pub const KEY_WALLET_ADDRESS: &str = "walletAddress";
pub const KEY_WALLET_NAME: &str = "walletName";
pub const KEY_WALLET_CHAIN_ID: &str = "wallet_chainId";
pub const KEY_SUBSCRIPTION_TRANSACTIONS: &str = "subscriptionTransactions";
pub const KEY_CREATED_SUBSCRIPTIONS: &str = "createdSubscriptions";
pub const KEY_RELOAD_IN_PROGRESS: &str = "walletReloadInProgress";

/// Keys describing the current connection.
pub const CONNECTION_KEYS: [&str; 4] = [
    KEY_WALLET_CONNECTED,
    KEY_WALLET_ADDRESS,
    KEY_WALLET_NAME,
    KEY_WALLET_CHAIN_ID,
];

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Storage backed by a single JSON object file.
///
/// The file is re-read on every access so that changes made by another
/// process are visible; writes go through a temporary file and a rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (without creating) the storage file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating storage directory {}", parent.display()))?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)
            .with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replacing {}", self.path.display()))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// Read a key, logging and swallowing storage errors.
pub fn read_or_log(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "storage read failed");
            None
        }
    }
}

pub fn write_or_log(store: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(err) = store.set(key, value) {
        warn!(key, error = %err, "storage write failed");
    }
}

pub fn remove_or_log(store: &dyn KeyValueStore, key: &str) {
    if let Err(err) = store.remove(key) {
        warn!(key, error = %err, "storage remove failed");
    }
}

// =============================================================================
// Transaction history
// =============================================================================

/// Entry of the `subscriptionTransactions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub digest: String,
    pub timestamp: DateTime<Utc>,
}

/// Entry of the `createdSubscriptions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSubscription {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Manually entered digests must start with `0x`.
    InvalidDigest(String),
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::InvalidDigest(d) => write!(f, "invalid transaction digest '{}': must start with 0x", d),
        }
    }
}

impl std::error::Error for HistoryError {}

/// The locally cached lists of submitted transactions and created
/// subscriptions, oldest first.
#[derive(Clone)]
pub struct TransactionHistory {
    store: Arc<dyn KeyValueStore>,
}

impl TransactionHistory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.read_list(KEY_SUBSCRIPTION_TRANSACTIONS)
    }

    /// Append a digest returned by a successful submission.
    pub fn record_transaction(&self, digest: &str) {
        let mut list = self.transactions();
        if list.iter().any(|r| r.digest == digest) {
            return;
        }
        list.push(TransactionRecord {
            digest: digest.to_string(),
            timestamp: Utc::now(),
        });
        self.write_list(KEY_SUBSCRIPTION_TRANSACTIONS, &list);
    }

    /// Append a user-entered digest.
    pub fn add_transaction(&self, digest: &str) -> Result<(), HistoryError> {
        let digest = digest.trim();
        if !digest.starts_with("0x") {
            return Err(HistoryError::InvalidDigest(digest.to_string()));
        }
        self.record_transaction(digest);
        Ok(())
    }

    pub fn clear_transactions(&self) {
        remove_or_log(self.store.as_ref(), KEY_SUBSCRIPTION_TRANSACTIONS);
    }

    pub fn created_subscriptions(&self) -> Vec<CreatedSubscription> {
        self.read_list(KEY_CREATED_SUBSCRIPTIONS)
    }

    pub fn record_created(&self, id: &str, digest: Option<&str>) {
        let mut list = self.created_subscriptions();
        if list.iter().any(|c| c.id == id) {
            return;
        }
        list.push(CreatedSubscription {
            id: id.to_string(),
            digest: digest.map(String::from),
            timestamp: Utc::now(),
        });
        self.write_list(KEY_CREATED_SUBSCRIPTIONS, &list);
    }

    pub fn clear_created(&self) {
        remove_or_log(self.store.as_ref(), KEY_CREATED_SUBSCRIPTIONS);
    }

    fn read_list<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Vec<T> {
        let Some(raw) = read_or_log(self.store.as_ref(), key) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(err) => {
                warn!(key, error = %err, "ignoring malformed history list");
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, list: &[T]) {
        match serde_json::to_string(list) {
            Ok(raw) => write_or_log(self.store.as_ref(), key, &raw),
            Err(err) => warn!(key, error = %err, "failed to encode history list"),
        }
    }
}
