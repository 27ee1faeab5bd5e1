//! Wallet error taxonomy.
//!
//! Every failure of the dispatcher reaches callers as a [`WalletError`]:
//!
//! | Variant | Retried | Typical remedy |
//! |---------|---------|----------------|
//! | `NotConnected` | never | connect a wallet |
//! | `NoAccount` | never | unlock / add an account |
//! | `UnsupportedWallet` | never | use a different wallet |
//! | `WrongNetwork` | after switching | switch the wallet's network |
//! | `SigningFailed` | user decision | depends on [`FailureCategory`] |
//!
//! Signing failures are categorized from the wallet's structured error code
//! when there is one; the message substring table is a last resort.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::handle::WalletCallError;

// =============================================================================
// Failure categories
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    UserRejected,
    InsufficientGas,
    /// Signature or authority check failed.
    AuthorityFailure,
    /// The Move call aborted.
    ContractAbort,
    NetworkOrNotFound,
    /// The wallet did not accept the chain identifier it was given.
    ChainIdentifier,
    Uncategorized,
}

/// Structured wallet codes (EIP-1193 provider errors, which Sui wallets reuse).
const STRUCTURED_CODES: &[(i64, FailureCategory)] = &[
    (4001, FailureCategory::UserRejected),
    (4100, FailureCategory::AuthorityFailure),
    (4900, FailureCategory::NetworkOrNotFound),
    (4901, FailureCategory::NetworkOrNotFound),
];

/// Message fragments, matched case-insensitively. First match wins, so the
/// more specific fragments come first.
const MESSAGE_PATTERNS: &[(&str, FailureCategory)] = &[
    ("chain identifier", FailureCategory::ChainIdentifier),
    ("chain id", FailureCategory::ChainIdentifier),
    ("rejected", FailureCategory::UserRejected),
    ("denied", FailureCategory::UserRejected),
    ("cancelled", FailureCategory::UserRejected),
    ("canceled", FailureCategory::UserRejected),
    ("insufficient gas", FailureCategory::InsufficientGas),
    ("insufficientgas", FailureCategory::InsufficientGas),
    ("gas budget", FailureCategory::InsufficientGas),
    ("gasbalancetoolow", FailureCategory::InsufficientGas),
    ("no valid gas coins", FailureCategory::InsufficientGas),
    ("signature", FailureCategory::AuthorityFailure),
    ("authority", FailureCategory::AuthorityFailure),
    ("unauthorized", FailureCategory::AuthorityFailure),
    ("not authorized", FailureCategory::AuthorityFailure),
    ("moveabort", FailureCategory::ContractAbort),
    ("move abort", FailureCategory::ContractAbort),
    ("abort", FailureCategory::ContractAbort),
    ("not found", FailureCategory::NetworkOrNotFound),
    ("could not find", FailureCategory::NetworkOrNotFound),
    ("does not exist", FailureCategory::NetworkOrNotFound),
    ("network", FailureCategory::NetworkOrNotFound),
    ("timeout", FailureCategory::NetworkOrNotFound),
    ("timed out", FailureCategory::NetworkOrNotFound),
    ("failed to fetch", FailureCategory::NetworkOrNotFound),
];

impl FailureCategory {
    /// Categorize a wallet failure. A recognized structured code takes
    /// precedence over the message.
    pub fn categorize(code: Option<i64>, message: &str) -> Self {
        if let Some(code) = code {
            if let Some((_, category)) = STRUCTURED_CODES.iter().find(|(c, _)| *c == code) {
                return *category;
            }
        }
        let lower = message.to_lowercase();
        MESSAGE_PATTERNS
            .iter()
            .find(|(fragment, _)| lower.contains(fragment))
            .map(|(_, category)| *category)
            .unwrap_or(FailureCategory::Uncategorized)
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            FailureCategory::UserRejected => "user_rejected",
            FailureCategory::InsufficientGas => "insufficient_gas",
            FailureCategory::AuthorityFailure => "authority_failure",
            FailureCategory::ContractAbort => "contract_abort",
            FailureCategory::NetworkOrNotFound => "network_or_not_found",
            FailureCategory::ChainIdentifier => "chain_identifier",
            FailureCategory::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

// =============================================================================
// Wallet errors
// =============================================================================

/// A wallet call that failed, with everything the wallet told us.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningFailure {
    /// The wallet's message, unchanged.
    pub message: String,
    /// Display name of the wallet that failed.
    pub vendor: String,
    pub code: Option<i64>,
    pub data: Option<Value>,
    pub category: FailureCategory,
}

impl SigningFailure {
    pub fn from_call_error(vendor: &str, err: WalletCallError) -> Self {
        Self {
            category: FailureCategory::categorize(err.code, &err.message),
            message: err.message,
            vendor: vendor.to_string(),
            code: err.code,
            data: err.data,
        }
    }

    pub fn user_message(&self) -> String {
        match self.category {
            FailureCategory::UserRejected => "Transaction was rejected in the wallet.".to_string(),
            FailureCategory::InsufficientGas => {
                "Not enough SUI to pay for gas. Top up the wallet and try again.".to_string()
            }
            FailureCategory::AuthorityFailure => {
                "The wallet could not authorize this transaction. Make sure the connected account owns the objects involved.".to_string()
            }
            FailureCategory::ContractAbort => {
                format!("The subscription contract rejected the transaction: {}", self.message)
            }
            FailureCategory::NetworkOrNotFound => {
                "Could not reach the network or find a referenced object. Check your connection and try again.".to_string()
            }
            FailureCategory::ChainIdentifier => {
                "The wallet rejected the chain identifier. Switch the wallet to the expected network and retry.".to_string()
            }
            FailureCategory::Uncategorized => format!("Transaction failed: {}", self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletError {
    NotConnected,
    NoAccount,
    UnsupportedWallet {
        wallet: String,
        available_methods: Vec<String>,
    },
    WrongNetwork {
        expected: String,
        detected: Option<String>,
    },
    SigningFailed(SigningFailure),
}

impl WalletError {
    /// Whether retrying the same call could succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WalletError::SigningFailed(SigningFailure {
                category: FailureCategory::NetworkOrNotFound,
                ..
            })
        )
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            WalletError::SigningFailed(f) => Some(f.category),
            _ => None,
        }
    }

    /// Actionable text for end users.
    pub fn user_message(&self) -> String {
        match self {
            WalletError::NotConnected => {
                "Wallet not connected. Please connect your wallet first.".to_string()
            }
            WalletError::NoAccount => {
                "No account found in the wallet. Unlock it or add an account, then reconnect."
                    .to_string()
            }
            WalletError::UnsupportedWallet {
                wallet,
                available_methods,
            } => format!(
                "{} does not support transaction signing (available: {}). Please use a different wallet.",
                wallet,
                if available_methods.is_empty() {
                    "none".to_string()
                } else {
                    available_methods.join(", ")
                }
            ),
            WalletError::WrongNetwork { expected, detected } => format!(
                "Wallet is on {}, but this app uses {}. Switch networks in your wallet settings.",
                detected.as_deref().unwrap_or("an unknown network"),
                expected
            ),
            WalletError::SigningFailed(f) => f.user_message(),
        }
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::NotConnected => write!(f, "wallet not connected"),
            WalletError::NoAccount => write!(f, "wallet has no accounts"),
            WalletError::UnsupportedWallet {
                wallet,
                available_methods,
            } => write!(
                f,
                "wallet {} has no supported signing method (methods: [{}])",
                wallet,
                available_methods.join(", ")
            ),
            WalletError::WrongNetwork { expected, detected } => write!(
                f,
                "wallet on wrong network: expected {}, detected {}",
                expected,
                detected.as_deref().unwrap_or("unknown")
            ),
            WalletError::SigningFailed(fail) => {
                write!(f, "{} signing failed ({}): {}", fail.vendor, fail.category, fail.message)?;
                if let Some(code) = fail.code {
                    write!(f, " [code {}]", code)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for WalletError {}
