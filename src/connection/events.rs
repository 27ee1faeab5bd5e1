//! Connection event bus.
//!
//! Delivery is synchronous: [`EventBus::emit`] returns after every listener
//! has run. Listeners are called outside the registry lock, so a listener may
//! subscribe or unsubscribe while handling an event.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Payload of a connection-changed broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionChanged {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expected_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed: Option<bool>,
}

impl ConnectionChanged {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            address: None,
            name: None,
            chain_id: None,
            is_expected_network: None,
            changed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Changed(ConnectionChanged),
    /// A rehydrated connection was checked against a live wallet.
    ReconnectAttempt,
}

pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&ConnectionEvent) + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ConnectionEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn emit(&self, event: &ConnectionEvent) {
        let snapshot: Vec<Listener> = self.listeners.read().iter().map(|(_, l)| l.clone()).collect();
        for listener in snapshot {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_emit_reaches_all_listeners() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let seen = seen.clone();
            bus.subscribe(move |event| seen.lock().push((tag, event.clone())));
        }
        bus.emit(&ConnectionEvent::ReconnectAttempt);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(|_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_disconnected_payload_serializes_minimal() {
        let json = serde_json::to_value(ConnectionChanged::disconnected()).unwrap();
        assert_eq!(json, serde_json::json!({ "connected": false }));
    }

    #[test]
    fn test_connected_payload_is_camel_case() {
        let event = ConnectionChanged {
            connected: true,
            address: Some("0xaaa".into()),
            name: Some("Suiet".into()),
            chain_id: Some("sui:testnet".into()),
            is_expected_network: Some(true),
            changed: Some(false),
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["chainId"], "sui:testnet");
        assert_eq!(json["isExpectedNetwork"], true);
    }
}
