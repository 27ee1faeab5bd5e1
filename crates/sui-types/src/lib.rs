//! Shared types for the sui-subscriptions workspace.
//!
//! This crate holds the value types that cross crate boundaries: wallet-facing
//! transaction requests and results, address helpers, and environment parsing.
//!
//! ## Transaction Types
//!
//! The [`transaction`] module contains the request/response shapes exchanged
//! with wallets:
//! - [`TransactionRequest`](transaction::TransactionRequest) - an unsigned Move call
//! - [`TransactionResult`](transaction::TransactionResult) - the normalized outcome
//! - [`ResultOptions`](transaction::ResultOptions) - which response sections to include

pub mod address;
pub mod env_utils;
pub mod transaction;

pub use address::{normalize_address, normalize_address_checked, short_address};
pub use env_utils::{env_millis_or, env_string_or, env_var, env_var_or};
pub use transaction::{
    CallArg, MoveCallTarget, ObjectChange, ObjectChangeKind, ResultOptions, SignedTransaction,
    TransactionRequest, TransactionResult,
};

use std::time::Duration;

/// Delays between attempts of a post-submission confirmation lookup.
///
/// The first attempt always runs immediately; each entry in `delays` adds one
/// more attempt preceded by that delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSchedule {
    pub delays: Vec<Duration>,
}

impl ConfirmationSchedule {
    /// Immediate attempt, one retry after `short`, a final retry after `long`.
    pub fn new(short_ms: u64, long_ms: u64) -> Self {
        Self {
            delays: vec![Duration::from_millis(short_ms), Duration::from_millis(long_ms)],
        }
    }

    /// Total number of attempts, including the immediate one.
    pub fn attempts(&self) -> usize {
        self.delays.len() + 1
    }
}

impl Default for ConfirmationSchedule {
    fn default() -> Self {
        Self::new(2000, 5000)
    }
}
