//! Sui Transport Layer
//!
//! Read access to the Sui ledger for the subscriptions client.
//!
//! This crate provides:
//! - [`client`]: the [`ChainClient`] trait every query goes through
//! - [`jsonrpc`]: a JSON-RPC implementation backed by a fullnode
//! - [`network`]: network names, chain identifiers and default endpoints
//! - [`test_utils`]: an in-memory [`ChainClient`] and JSON fixture builders
//!
//! Submission never happens here: transactions reach the chain through the
//! user's wallet.
//!
//! # Example
//!
//! ```ignore
//! use sui_subscriptions_transport::{ChainClient, JsonRpcClient};
//! use sui_subscriptions_types::ResultOptions;
//!
//! let client = JsonRpcClient::testnet();
//! let tx = client.get_transaction_block("8JTTa...", ResultOptions::inspection()).await?;
//! ```

pub mod client;
pub mod jsonrpc;
pub mod network;
pub mod test_utils;

pub use client::{Balance, ChainClient, ObjectFilter};
pub use jsonrpc::JsonRpcClient;
pub use network::{Network, NetworkInfo};
