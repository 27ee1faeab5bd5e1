//! Test utilities for chain client consumers.
//!
//! Provides an in-memory [`ChainClient`] and builders for the JSON shapes the
//! fullnode returns, so read models and confirmation logic can be tested
//! without a network.

use std::collections::{HashMap, VecDeque};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use sui_subscriptions_types::{normalize_address, ResultOptions};

use crate::client::{Balance, ChainClient, ObjectFilter};

/// Scripted answer for one `get_transaction_block` call.
#[derive(Debug, Clone)]
pub enum ScriptedLookup {
    NotFound,
    Found(Value),
    Fail(String),
}

#[derive(Default)]
struct MockState {
    objects: HashMap<String, Value>,
    owners: HashMap<String, Vec<String>>,
    transactions: HashMap<String, Value>,
    scripted: HashMap<String, VecDeque<ScriptedLookup>>,
    balances: HashMap<String, u128>,
    transaction_calls: HashMap<String, usize>,
}

/// In-memory [`ChainClient`].
///
/// Objects are keyed by normalized id; ownership is tracked separately so the
/// same object can be listed for its owner.
#[derive(Default)]
pub struct MockChainClient {
    state: Mutex<MockState>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object owned by `owner`. The object's `objectId` is its key.
    pub fn insert_owned_object(&self, owner: &str, object: Value) {
        let id = object
            .get("objectId")
            .and_then(Value::as_str)
            .map(normalize_address)
            .unwrap_or_default();
        let mut state = self.state.lock();
        state
            .owners
            .entry(normalize_address(owner))
            .or_default()
            .push(id.clone());
        state.objects.insert(id, object);
    }

    /// Register an object with no owner listing (e.g. a shared object).
    pub fn insert_object(&self, object: Value) {
        if let Some(id) = object.get("objectId").and_then(Value::as_str) {
            self.state.lock().objects.insert(normalize_address(id), object);
        }
    }

    pub fn insert_transaction(&self, digest: &str, tx: Value) {
        self.state.lock().transactions.insert(digest.to_string(), tx);
    }

    /// Queue answers for successive lookups of `digest`. Once the queue is
    /// drained, lookups fall back to [`insert_transaction`](Self::insert_transaction) data.
    pub fn script_transaction(&self, digest: &str, answers: Vec<ScriptedLookup>) {
        self.state
            .lock()
            .scripted
            .insert(digest.to_string(), answers.into());
    }

    pub fn set_balance(&self, owner: &str, total: u128) {
        self.state.lock().balances.insert(normalize_address(owner), total);
    }

    /// How many times `get_transaction_block` was called for `digest`.
    pub fn transaction_calls(&self, digest: &str) -> usize {
        self.state
            .lock()
            .transaction_calls
            .get(digest)
            .copied()
            .unwrap_or(0)
    }
}

fn object_type(object: &Value) -> Option<&str> {
    object
        .get("type")
        .or_else(|| object.get("content").and_then(|c| c.get("type")))
        .and_then(Value::as_str)
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_object(&self, object_id: &str, _options: ResultOptions) -> Result<Option<Value>> {
        Ok(self
            .state
            .lock()
            .objects
            .get(&normalize_address(object_id))
            .cloned())
    }

    async fn get_owned_objects(
        &self,
        owner: &str,
        filter: Option<ObjectFilter>,
        _options: ResultOptions,
    ) -> Result<Vec<Value>> {
        let state = self.state.lock();
        let ids = state
            .owners
            .get(&normalize_address(owner))
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.objects.get(id))
            .filter(|obj| match (&filter, object_type(obj)) {
                (None, _) => true,
                (Some(f), Some(t)) => f.matches_type(t),
                (Some(_), None) => false,
            })
            .cloned()
            .collect())
    }

    async fn get_transaction_block(
        &self,
        digest: &str,
        _options: ResultOptions,
    ) -> Result<Option<Value>> {
        let mut state = self.state.lock();
        *state.transaction_calls.entry(digest.to_string()).or_default() += 1;

        if let Some(answer) = state.scripted.get_mut(digest).and_then(VecDeque::pop_front) {
            return match answer {
                ScriptedLookup::NotFound => Ok(None),
                ScriptedLookup::Found(tx) => Ok(Some(tx)),
                ScriptedLookup::Fail(msg) => Err(anyhow!(msg)),
            };
        }
        Ok(state.transactions.get(digest).cloned())
    }

    async fn get_balance(&self, owner: &str) -> Result<Balance> {
        let total = self
            .state
            .lock()
            .balances
            .get(&normalize_address(owner))
            .copied()
            .unwrap_or(0);
        Ok(Balance {
            coin_type: "0x2::sui::SUI".to_string(),
            total_balance: total,
            coin_object_count: u64::from(total > 0),
        })
    }
}

/// Builder for `Subscription` object JSON as returned by `sui_getObject` with
/// `showContent`.
///
/// # Example
///
/// ```ignore
/// let obj = SubscriptionObjectBuilder::new("0xsub", "0xpkg")
///     .merchant("0xmerchant")
///     .amount(1_000_000_000)
///     .interval_secs(86_400)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct SubscriptionObjectBuilder {
    object_id: String,
    package_id: String,
    fields: serde_json::Map<String, Value>,
}

impl SubscriptionObjectBuilder {
    pub fn new(object_id: &str, package_id: &str) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("id".into(), json!({ "id": object_id }));
        Self {
            object_id: object_id.to_string(),
            package_id: package_id.to_string(),
            fields,
        }
    }

    pub fn merchant(mut self, addr: &str) -> Self {
        self.fields.insert("merchant".into(), json!(addr));
        self
    }

    pub fn subscriber(mut self, addr: &str) -> Self {
        self.fields.insert("subscriber".into(), json!(addr));
        self
    }

    /// Chain u64 values are serialized as strings.
    pub fn amount(mut self, minor_units: u64) -> Self {
        self.fields
            .insert("amount".into(), json!(minor_units.to_string()));
        self
    }

    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.fields
            .insert("interval_secs".into(), json!(secs.to_string()));
        self
    }

    pub fn next_payment_time(mut self, ts: u64) -> Self {
        self.fields
            .insert("next_payment_time".into(), json!(ts.to_string()));
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.fields
            .insert("status".into(), json!({ "fields": { "active": active } }));
        self
    }

    pub fn payment_count(mut self, n: u64) -> Self {
        self.fields
            .insert("payment_count".into(), json!(n.to_string()));
        self
    }

    /// Set an arbitrary raw field, e.g. to inject malformed data.
    pub fn raw_field(mut self, name: &str, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Value {
        let type_ = format!("{}::subscription::Subscription", self.package_id);
        json!({
            "objectId": self.object_id,
            "version": "7",
            "type": type_,
            "content": {
                "dataType": "moveObject",
                "type": type_,
                "hasPublicTransfer": true,
                "fields": Value::Object(self.fields),
            }
        })
    }
}

/// A `sui_getTransactionBlock` response whose `objectChanges` contains a
/// created object of `object_type`.
pub fn transaction_with_created(digest: &str, object_id: &str, object_type: &str) -> Value {
    json!({
        "digest": digest,
        "effects": { "status": { "status": "success" } },
        "objectChanges": [
            { "type": "created", "objectId": object_id, "objectType": object_type }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_owned_objects_filter() {
        let client = MockChainClient::new();
        client.insert_owned_object(
            "0xa11ce",
            SubscriptionObjectBuilder::new("0x51", "0xp").build(),
        );
        client.insert_owned_object("0xa11ce", json!({ "objectId": "0x52", "type": "0x2::coin::Coin<0x2::sui::SUI>" }));

        let all = client
            .get_owned_objects("0xA11CE", None, ResultOptions::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let subs = client
            .get_owned_objects(
                "0xa11ce",
                Some(ObjectFilter::StructType("0xp::subscription::Subscription".into())),
                ResultOptions::object_content(),
            )
            .await
            .unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0]["objectId"], json!("0x51"));
    }

    #[tokio::test]
    async fn test_scripted_lookup_then_fallback() {
        let client = MockChainClient::new();
        client.insert_transaction("D", json!({ "digest": "D" }));
        client.script_transaction(
            "D",
            vec![ScriptedLookup::NotFound, ScriptedLookup::Fail("boom".into())],
        );

        let opts = ResultOptions::inspection();
        assert!(client.get_transaction_block("D", opts).await.unwrap().is_none());
        assert!(client.get_transaction_block("D", opts).await.is_err());
        assert!(client.get_transaction_block("D", opts).await.unwrap().is_some());
        assert_eq!(client.transaction_calls("D"), 3);
    }
}
