//! Sui Subscriptions
//!
//! Client library for recurring payments on Sui. The subscription logic lives
//! in an external Move package; this crate gets transactions signed by
//! whatever wallet the user has and keeps the wallet connection in sync:
//!
//! - **Wallet layer**: capability probing and transaction dispatch across
//!   wallet shapes, see [`wallet`]
//! - **Connection state**: the single writer of connection state, its
//!   persistence and change events, see [`connection`]
//! - **Contract client**: Move call builders, guarded actions, and queries,
//!   see [`contract`]
//! - **Read model**: display records for on-chain subscriptions, see
//!   [`read_model`]
//!
//! Chain access goes through [`sui_subscriptions_transport::ChainClient`].

#![allow(clippy::result_large_err)]

pub mod config;
pub mod confirm;
pub mod connection;
pub mod contract;
pub mod inspect;
pub mod logging;
pub mod read_model;
pub mod storage;
pub mod wallet;

pub use config::AppConfig;
pub use confirm::Confirmation;
pub use connection::{ConnectionState, ConnectionStore};
pub use contract::{ContractError, SubscriptionService};
pub use read_model::{format, SubscriptionRecord};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage, TransactionHistory};
pub use wallet::{probe, TransactionExecutor, WalletError, WalletHandle};
