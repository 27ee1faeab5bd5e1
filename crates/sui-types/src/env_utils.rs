//! Environment variable parsing utilities.
//!
//! Configuration in this workspace comes from environment variables with
//! compiled-in defaults. These helpers remove the repeated
//! `std::env::var(..).ok().and_then(..).unwrap_or(..)` chains.
//!
//! ```
//! use sui_subscriptions_types::env_utils::{env_string_or, env_var_or};
//!
//! let debounce_ms: u64 = env_var_or("WALLET_RELOAD_DEBOUNCE_MS", 1000);
//! let network = env_string_or("SUI_NETWORK", "testnet");
//! ```

use std::str::FromStr;
use std::time::Duration;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is unset, blank, or does not parse.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable, falling back to `default`.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable; unset or blank values yield `default`.
pub fn env_string_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a millisecond count as a `Duration`.
pub fn env_millis_or(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_var_or(key, default_ms))
}
