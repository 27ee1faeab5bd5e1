//! The chain client interface.
//!
//! Everything the subscriptions client reads from the ledger goes through
//! [`ChainClient`]. Implementations return raw JSON in the shape of the Sui
//! JSON-RPC responses so that read models can be built from either a live
//! node or a fixture.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sui_subscriptions_types::ResultOptions;

/// Filter for owned-object listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFilter {
    /// Fully qualified struct type, e.g. `0xpkg::subscription::Subscription`.
    StructType(String),
    /// Any object from the given package.
    Package(String),
}

impl ObjectFilter {
    /// Local evaluation against an object's `type` string.
    pub fn matches_type(&self, object_type: &str) -> bool {
        match self {
            ObjectFilter::StructType(t) => object_type == t || object_type.starts_with(&format!("{}<", t)),
            ObjectFilter::Package(p) => object_type.starts_with(&format!("{}::", p)),
        }
    }
}

/// Coin balance of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub coin_type: String,
    /// Minor units.
    pub total_balance: u128,
    pub coin_object_count: u64,
}

impl Balance {
    /// Parse a `suix_getBalance` result. Numeric fields may be strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            coin_type: value
                .get("coinType")
                .and_then(Value::as_str)
                .unwrap_or("0x2::sui::SUI")
                .to_string(),
            total_balance: parse_u128(value.get("totalBalance")?)?,
            coin_object_count: value
                .get("coinObjectCount")
                .and_then(parse_u128)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
        })
    }
}

fn parse_u128(value: &Value) -> Option<u128> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
}

/// Read interface to a Sui fullnode.
///
/// Every method is a suspension point; none of them retries on its own.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch an object. `Ok(None)` when the object does not exist.
    async fn get_object(&self, object_id: &str, options: ResultOptions) -> Result<Option<Value>>;

    /// List objects owned by `owner`, optionally filtered.
    async fn get_owned_objects(
        &self,
        owner: &str,
        filter: Option<ObjectFilter>,
        options: ResultOptions,
    ) -> Result<Vec<Value>>;

    /// Fetch a transaction. `Ok(None)` when the node does not know it (yet).
    async fn get_transaction_block(
        &self,
        digest: &str,
        options: ResultOptions,
    ) -> Result<Option<Value>>;

    /// SUI balance of `owner`.
    async fn get_balance(&self, owner: &str) -> Result<Balance>;
}
