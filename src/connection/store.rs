//! Connection state store.
//!
//! The store is the only writer of the current [`ConnectionState`] and of the
//! persisted connection keys. Readers take snapshots through
//! [`ConnectionStore::state`] or subscribe to [`ConnectionEvent`]s.
//!
//! ## State machine
//!
//! ```text
//! Disconnected --rehydrate--> Connecting --live handle--> Connected(*) | Disconnected
//! Connected(*) --0 accounts--> Disconnected
//! Connected(A) --account B--> Connected(B) + one debounced reload
//! ```
//!
//! Wallet notifications may resolve out of order. Each reconciliation carries
//! a [`ReconcileTicket`]; a ticket older than the last applied one is dropped.

use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, info};

use sui_subscriptions_transport::NetworkInfo;
use sui_subscriptions_types::address::same_address;

use super::events::{ConnectionChanged, ConnectionEvent, EventBus, ListenerId};
use super::reload::{ReloadGate, ReloadReason, ViewReloader};
use crate::storage::{
    read_or_log, remove_or_log, write_or_log, KeyValueStore, CONNECTION_KEYS, KEY_WALLET_ADDRESS,
    KEY_WALLET_CHAIN_ID, KEY_WALLET_CONNECTED, KEY_WALLET_NAME,
};
use crate::wallet::{detect_network, probe, CapabilityReport, WalletHandle};

/// Why a connected wallet cannot be used as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConnectionIssue {
    UnsupportedWallet { available_methods: Vec<String> },
    WrongNetwork { expected: String, detected: Option<String> },
}

impl fmt::Display for ConnectionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionIssue::UnsupportedWallet { available_methods } => write!(
                f,
                "wallet does not support transaction signing (methods: [{}])",
                available_methods.join(", ")
            ),
            ConnectionIssue::WrongNetwork { expected, detected } => write!(
                f,
                "wallet is on {} but {} is expected",
                detected.as_deref().unwrap_or("an unknown network"),
                expected
            ),
        }
    }
}

impl std::error::Error for ConnectionIssue {}

/// Connection facts read back from storage at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConnection {
    pub address: String,
    pub name: String,
    pub chain_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    /// Never empty.
    pub address: String,
    pub display_name: String,
    pub detected_chain_id: Option<String>,
    pub is_on_expected_network: bool,
    pub capabilities: CapabilityReport,
    pub error: Option<ConnectionIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Optimistically rehydrated, not yet checked against a live wallet.
    Connecting(PersistedConnection),
    Connected(WalletConnection),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    /// Address of the connection, live or rehydrated.
    pub fn address(&self) -> Option<&str> {
        match self {
            ConnectionState::Disconnected => None,
            ConnectionState::Connecting(p) => Some(&p.address),
            ConnectionState::Connected(c) => Some(&c.address),
        }
    }

    pub fn connection(&self) -> Option<&WalletConnection> {
        match self {
            ConnectionState::Connected(c) => Some(c),
            _ => None,
        }
    }
}

/// Orders reconciliations; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReconcileTicket(u64);

#[derive(Default)]
struct StoreInner {
    state: ConnectionState,
    /// Address from the last live handle; rehydrated addresses do not count.
    last_observed_address: Option<String>,
    applied_ticket: u64,
}

pub struct ConnectionStore {
    inner: Mutex<StoreInner>,
    storage: Arc<dyn KeyValueStore>,
    network: NetworkInfo,
    events: EventBus,
    reload_gate: ReloadGate,
    reloader: Option<Arc<dyn ViewReloader>>,
    next_ticket: AtomicU64,
}

impl ConnectionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>, network: NetworkInfo, reload_debounce: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            reload_gate: ReloadGate::new(storage.clone(), reload_debounce),
            storage,
            network,
            events: EventBus::new(),
            reloader: None,
            next_ticket: AtomicU64::new(1),
        }
    }

    pub fn with_reloader(mut self, reloader: Arc<dyn ViewReloader>) -> Self {
        self.reloader = Some(reloader);
        self
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state.clone()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Startup: move to `Connecting` from persisted keys, if they describe a
    /// connection and nothing live has been observed yet.
    pub fn rehydrate(&self) -> ConnectionState {
        let mut inner = self.inner.lock();
        if inner.state != ConnectionState::Disconnected {
            return inner.state.clone();
        }
        let storage = self.storage.as_ref();
        let connected = read_or_log(storage, KEY_WALLET_CONNECTED).as_deref() == Some("true");
        let address = read_or_log(storage, KEY_WALLET_ADDRESS).filter(|a| !a.is_empty());
        if let (true, Some(address)) = (connected, address) {
            let persisted = PersistedConnection {
                address,
                name: read_or_log(storage, KEY_WALLET_NAME).unwrap_or_default(),
                chain_id: read_or_log(storage, KEY_WALLET_CHAIN_ID),
            };
            debug!(address = %persisted.address, "rehydrated wallet connection");
            inner.state = ConnectionState::Connecting(persisted);
        }
        inner.state.clone()
    }

    /// Reserve a ticket before resolving a wallet handle asynchronously.
    pub fn begin_reconciliation(&self) -> ReconcileTicket {
        ReconcileTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst))
    }

    /// Apply a resolved handle. Returns false if a newer ticket already won.
    pub fn reconcile(&self, ticket: ReconcileTicket, handle: Option<&WalletHandle>) -> bool {
        let mut inner = self.inner.lock();
        if ticket.0 < inner.applied_ticket {
            debug!(ticket = ticket.0, applied = inner.applied_ticket, "discarding stale reconciliation");
            return false;
        }
        inner.applied_ticket = ticket.0;

        let was_connecting = matches!(inner.state, ConnectionState::Connecting(_));
        let accounts = handle.map(|h| h.accounts.as_slice()).unwrap_or_default();
        let (Some(handle), Some(account)) = (handle, accounts.first()) else {
            let was_active = inner.state != ConnectionState::Disconnected;
            inner.state = ConnectionState::Disconnected;
            inner.last_observed_address = None;
            self.clear_persisted();
            drop(inner);
            if was_connecting {
                self.events.emit(&ConnectionEvent::ReconnectAttempt);
            }
            if was_active {
                info!("wallet disconnected");
                self.events
                    .emit(&ConnectionEvent::Changed(ConnectionChanged::disconnected()));
            }
            return true;
        };

        let capabilities = probe(Some(handle));
        let status = detect_network(handle, &self.network);
        let error = if !capabilities.has_signing_capability() {
            Some(ConnectionIssue::UnsupportedWallet {
                available_methods: handle.method_names(),
            })
        } else if !status.is_expected_network {
            Some(ConnectionIssue::WrongNetwork {
                expected: self.network.chain_id.clone(),
                detected: status.detected_chain_id.clone(),
            })
        } else {
            None
        };

        let connection = WalletConnection {
            address: account.address.clone(),
            display_name: handle.name.clone(),
            detected_chain_id: status.detected_chain_id,
            is_on_expected_network: status.is_expected_network,
            capabilities,
            error,
        };
        let changed = inner
            .last_observed_address
            .as_deref()
            .is_some_and(|prev| !same_address(prev, &connection.address));

        self.persist(&connection);
        inner.last_observed_address = Some(connection.address.clone());
        inner.state = ConnectionState::Connected(connection.clone());
        drop(inner);

        info!(
            address = %connection.address,
            wallet = %connection.display_name,
            changed,
            issue = ?connection.error,
            "wallet connected"
        );
        if was_connecting {
            self.events.emit(&ConnectionEvent::ReconnectAttempt);
        }
        self.events.emit(&ConnectionEvent::Changed(ConnectionChanged {
            connected: true,
            address: Some(connection.address),
            name: Some(connection.display_name),
            chain_id: connection.detected_chain_id,
            is_expected_network: Some(connection.is_on_expected_network),
            changed: Some(changed),
        }));
        if changed {
            self.trigger_reload(ReloadReason::AddressChanged);
        }
        true
    }

    /// Reconcile with the handle most recently observed.
    pub fn on_wallet_handle_changed(&self, handle: Option<&WalletHandle>) -> bool {
        let ticket = self.begin_reconciliation();
        self.reconcile(ticket, handle)
    }

    /// Explicit disconnect by the user.
    pub fn disconnect(&self) {
        self.on_wallet_handle_changed(None);
    }

    /// A storage key was changed by another context.
    pub fn on_storage_changed(&self, key: &str) -> bool {
        if !CONNECTION_KEYS.contains(&key) {
            return false;
        }
        self.trigger_reload(ReloadReason::ExternalStorageChange)
    }

    /// The reload started by this store has finished.
    pub fn reload_completed(&self) {
        self.reload_gate.release();
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_gate.is_pending()
    }

    fn trigger_reload(&self, reason: ReloadReason) -> bool {
        let Some(reloader) = &self.reloader else {
            debug!(?reason, "no view reloader installed");
            return false;
        };
        if !self.reload_gate.try_acquire() {
            debug!(?reason, "reload already pending");
            return false;
        }
        info!(?reason, "reloading dependent views");
        reloader.reload(reason);
        true
    }

    fn persist(&self, connection: &WalletConnection) {
        let storage = self.storage.as_ref();
        write_or_log(storage, KEY_WALLET_CONNECTED, "true");
        write_or_log(storage, KEY_WALLET_ADDRESS, &connection.address);
        write_or_log(storage, KEY_WALLET_NAME, &connection.display_name);
        match &connection.detected_chain_id {
            Some(chain) => write_or_log(storage, KEY_WALLET_CHAIN_ID, chain),
            None => remove_or_log(storage, KEY_WALLET_CHAIN_ID),
        }
    }

    fn clear_persisted(&self) {
        for key in CONNECTION_KEYS {
            remove_or_log(self.storage.as_ref(), key);
        }
    }
}

static GLOBAL_STORE: OnceLock<Arc<ConnectionStore>> = OnceLock::new();

/// Install the process-wide store. Fails (returning the argument) if one is
/// already installed.
pub fn install_global(store: Arc<ConnectionStore>) -> Result<(), Arc<ConnectionStore>> {
    GLOBAL_STORE.set(store)
}

pub fn global() -> Option<Arc<ConnectionStore>> {
    GLOBAL_STORE.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (ConnectionStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ConnectionStore::new(storage.clone(), NetworkInfo::default(), Duration::from_secs(60));
        (store, storage)
    }

    #[test]
    fn test_rehydrate_requires_flag_and_address() {
        let (store, storage) = store();
        storage.set(KEY_WALLET_ADDRESS, "0xaaa").unwrap();
        assert_eq!(store.rehydrate(), ConnectionState::Disconnected);

        storage.set(KEY_WALLET_CONNECTED, "true").unwrap();
        storage.set(KEY_WALLET_NAME, "Suiet").unwrap();
        match store.rehydrate() {
            ConnectionState::Connecting(p) => {
                assert_eq!(p.address, "0xaaa");
                assert_eq!(p.name, "Suiet");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let (store, _) = store();
        let old = store.begin_reconciliation();
        let new = store.begin_reconciliation();
        let wallet = WalletHandle::new("w").with_account("0xbbb");
        assert!(store.reconcile(new, Some(&wallet)));
        assert!(!store.reconcile(old, None));
        assert_eq!(store.state().address(), Some("0xbbb"));
    }

    #[test]
    fn test_disconnect_from_idle_is_silent() {
        let (store, _) = store();
        let events = Arc::new(Mutex::new(0));
        let counter = events.clone();
        store.subscribe(move |_| *counter.lock() += 1);
        store.disconnect();
        assert_eq!(*events.lock(), 0);
    }

    #[test]
    fn test_global_install_once() {
        let (store, _) = store();
        let store = Arc::new(store);
        // Other tests in this binary may have installed one already.
        let _ = install_global(store.clone());
        assert!(global().is_some());
        assert!(install_global(store).is_err());
    }
}
