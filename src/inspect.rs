//! Transaction inspection.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use sui_subscriptions_transport::ChainClient;
use sui_subscriptions_types::transaction::parse_object_changes;
use sui_subscriptions_types::{ObjectChange, ObjectChangeKind, ResultOptions};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub event_type: String,
    pub parsed_json: Option<Value>,
}

/// The parts of a transaction block worth showing a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub digest: String,
    pub sender: Option<String>,
    /// `success`, `failure`, or `unknown`.
    pub status: String,
    pub error: Option<String>,
    pub gas_used: Option<u64>,
    pub events: Vec<EventSummary>,
    pub created: Vec<ObjectChange>,
    pub mutated: Vec<ObjectChange>,
}

impl TransactionSummary {
    pub fn from_value(digest: &str, tx: &Value) -> Self {
        let status = tx.pointer("/effects/status");
        let changes = parse_object_changes(tx);
        let of_kind = |kind: ObjectChangeKind| -> Vec<ObjectChange> {
            changes.iter().filter(|c| c.kind == kind).cloned().collect()
        };
        Self {
            digest: tx
                .get("digest")
                .and_then(Value::as_str)
                .unwrap_or(digest)
                .to_string(),
            sender: tx
                .pointer("/transaction/data/sender")
                .and_then(Value::as_str)
                .map(String::from),
            status: status
                .and_then(|s| s.get("status"))
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            error: status
                .and_then(|s| s.get("error"))
                .and_then(Value::as_str)
                .map(String::from),
            gas_used: gas_used(tx),
            events: tx
                .get("events")
                .and_then(Value::as_array)
                .map(|events| {
                    events
                        .iter()
                        .map(|e| EventSummary {
                            event_type: e
                                .get("type")
                                .and_then(Value::as_str)
                                .unwrap_or("unknown")
                                .to_string(),
                            parsed_json: e.get("parsedJson").cloned(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            created: of_kind(ObjectChangeKind::Created),
            mutated: of_kind(ObjectChangeKind::Mutated),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == "success"
    }
}

/// Net gas: computation + storage - rebate.
fn gas_used(tx: &Value) -> Option<u64> {
    let gas = tx.pointer("/effects/gasUsed")?;
    let field = |name: &str| -> Option<i128> {
        match gas.get(name)? {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64().map(i128::from),
            _ => None,
        }
    };
    let net = field("computationCost")? + field("storageCost")? - field("storageRebate").unwrap_or(0);
    u64::try_from(net.max(0)).ok()
}

/// Look up and summarize a transaction. `Ok(None)` when it is unknown.
pub async fn inspect_transaction(client: &dyn ChainClient, digest: &str) -> Result<Option<TransactionSummary>> {
    let tx = client
        .get_transaction_block(digest, ResultOptions::inspection())
        .await?;
    Ok(tx.map(|tx| TransactionSummary::from_value(digest, &tx)))
}
