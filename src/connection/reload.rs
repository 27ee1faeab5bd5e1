//! Debounced full reload of dependent views.
//!
//! The gate is an advisory lock: acquiring it records a timestamp both in
//! memory and under `walletReloadInProgress`, and it expires by itself once
//! the debounce window has passed. Other contexts sharing the storage see the
//! persisted timestamp and do not start a second reload.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::storage::{read_or_log, remove_or_log, write_or_log, KeyValueStore, KEY_RELOAD_IN_PROGRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The wallet switched to a different account.
    AddressChanged,
    /// Connection keys were changed by another context.
    ExternalStorageChange,
}

/// Reloads whatever depends on the current connection.
pub trait ViewReloader: Send + Sync {
    fn reload(&self, reason: ReloadReason);
}

pub struct ReloadGate {
    storage: Arc<dyn KeyValueStore>,
    window: Duration,
    acquired_at: Mutex<Option<Instant>>,
}

impl ReloadGate {
    pub fn new(storage: Arc<dyn KeyValueStore>, window: Duration) -> Self {
        Self {
            storage,
            window,
            acquired_at: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Take the gate unless a reload is already pending.
    pub fn try_acquire(&self) -> bool {
        let mut acquired_at = self.acquired_at.lock();
        if acquired_at.is_some_and(|t| t.elapsed() < self.window) {
            return false;
        }
        if self.persisted_pending() {
            debug!("reload already pending in another context");
            return false;
        }
        *acquired_at = Some(Instant::now());
        write_or_log(self.storage.as_ref(), KEY_RELOAD_IN_PROGRESS, &Utc::now().to_rfc3339());
        true
    }

    /// Clear the gate once the reload finished.
    pub fn release(&self) {
        *self.acquired_at.lock() = None;
        remove_or_log(self.storage.as_ref(), KEY_RELOAD_IN_PROGRESS);
    }

    pub fn is_pending(&self) -> bool {
        self.acquired_at
            .lock()
            .is_some_and(|t| t.elapsed() < self.window)
            || self.persisted_pending()
    }

    fn persisted_pending(&self) -> bool {
        let Some(raw) = read_or_log(self.storage.as_ref(), KEY_RELOAD_IN_PROGRESS) else {
            return false;
        };
        let Ok(since) = DateTime::parse_from_rfc3339(&raw) else {
            return false;
        };
        let age = Utc::now().signed_duration_since(since.with_timezone(&Utc));
        // A timestamp in the future counts as fresh.
        age.to_std().map(|age| age < self.window).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_second_acquire_within_window_fails() {
        let gate = ReloadGate::new(Arc::new(MemoryStorage::new()), Duration::from_secs(60));
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert!(gate.is_pending());
        gate.release();
        assert!(!gate.is_pending());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_gate_expires_after_window() {
        let gate = ReloadGate::new(Arc::new(MemoryStorage::new()), Duration::ZERO);
        assert!(gate.try_acquire());
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_gate_shared_through_storage() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        let a = ReloadGate::new(storage.clone(), Duration::from_secs(60));
        let b = ReloadGate::new(storage.clone(), Duration::from_secs(60));
        assert!(a.try_acquire());
        assert!(!b.try_acquire());
        a.release();
        assert!(b.try_acquire());
    }

    #[test]
    fn test_garbage_timestamp_is_ignored() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStorage::new());
        storage.set(KEY_RELOAD_IN_PROGRESS, "yesterday").unwrap();
        let gate = ReloadGate::new(storage, Duration::from_secs(60));
        assert!(gate.try_acquire());
    }
}
