#![allow(unused_imports, dead_code)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `mocks`: scripted wallet entry points, reloaders, and storage
//! - `fixtures`: ready-made wallets, stores, and services
//! - `assertions`: assertion helpers with better failure messages

pub mod assertions;
pub mod fixtures;
pub mod mocks;

pub use assertions::{assert_err, assert_error_contains, assert_ok};
pub use fixtures::{
    bare_wallet, fast_schedule, new_service, new_store, slush_wallet, standard_wallet, PACKAGE,
    SUBSCRIBER,
};
pub use mocks::{FailingStorage, MockExecutor, MockSignAndExecute, MockSigner, RecordingReloader};
