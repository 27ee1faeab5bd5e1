//! Wallet execution compatibility layer.
//!
//! - [`handle`]: the runtime shape of a wallet, as capability slots
//! - [`capability`]: probing and dispatch priority
//! - [`dispatch`]: the transaction executor
//! - [`error`]: typed errors and failure categories
//! - [`network`]: network detection and switching
//! - [`diagnostics`]: human-readable capability report

pub mod capability;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod network;

pub use capability::{probe, CapabilityReport, DispatchPath, VendorQuirk};
pub use diagnostics::describe_wallet;
pub use dispatch::TransactionExecutor;
pub use error::{FailureCategory, SigningFailure, WalletError};
pub use handle::{
    ExecuteInput, ExecuteRequestType, ExecuteTransaction, SignAndExecute, SignAndExecuteInput,
    SignInput, SignTransaction, SwitchNetwork, WalletAccount, WalletCallError, WalletFeature,
    WalletHandle,
};
pub use network::{attempt_network_switch, detect_network, NetworkStatus, SwitchOutcome};
