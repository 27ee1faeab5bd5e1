//! Client-side wallet connection state.

pub mod events;
pub mod reload;
pub mod store;

pub use events::{ConnectionChanged, ConnectionEvent, EventBus, ListenerId};
pub use reload::{ReloadGate, ReloadReason, ViewReloader};
pub use store::{
    global, install_global, ConnectionIssue, ConnectionState, ConnectionStore, PersistedConnection,
    ReconcileTicket, WalletConnection,
};
