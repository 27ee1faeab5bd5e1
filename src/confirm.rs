//! Post-submission confirmation.
//!
//! A freshly submitted transaction may not be indexed yet. Lookups run on a
//! [`ConfirmationSchedule`]: immediately, then once after each delay. If all
//! attempts come back empty the outcome is [`Confirmation::Inconclusive`],
//! which callers must treat as "not yet confirmed" and not as a failure.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tracing::debug;

use sui_subscriptions_transport::ChainClient;
use sui_subscriptions_types::address::same_address;
use sui_subscriptions_types::transaction::parse_object_changes;
use sui_subscriptions_types::{ConfirmationSchedule, ObjectChangeKind, ResultOptions};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Confirmation<T> {
    Confirmed { value: T, attempts: usize },
    Inconclusive { attempts: usize, last_error: Option<String> },
}

impl<T> Confirmation<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Confirmation::Confirmed { value, .. } => Some(value),
            Confirmation::Inconclusive { .. } => None,
        }
    }

    pub fn attempts(&self) -> usize {
        match self {
            Confirmation::Confirmed { attempts, .. } | Confirmation::Inconclusive { attempts, .. } => *attempts,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Confirmation::Confirmed { value, .. } => Some(value),
            Confirmation::Inconclusive { .. } => None,
        }
    }
}

/// Run `lookup` on `schedule` until it yields a value. Errors count as "not
/// found yet". The argument passed to `lookup` is the 1-based attempt number.
pub async fn retry_lookup<T, F, Fut>(schedule: &ConfirmationSchedule, mut lookup: F) -> Confirmation<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut last_error = None;
    let delays = std::iter::once(None).chain(schedule.delays.iter().copied().map(Some));
    for (index, delay) in delays.enumerate() {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let attempt = index + 1;
        match lookup(attempt).await {
            Ok(Some(value)) => return Confirmation::Confirmed { value, attempts: attempt },
            Ok(None) => debug!(attempt, "lookup returned nothing yet"),
            Err(err) => {
                debug!(attempt, error = %err, "lookup failed");
                last_error = Some(err.to_string());
            }
        }
    }
    Confirmation::Inconclusive {
        attempts: schedule.attempts(),
        last_error,
    }
}

/// Fetch a submitted transaction, retrying while it is not yet indexed.
pub async fn confirm_transaction(
    client: &dyn ChainClient,
    digest: &str,
    schedule: &ConfirmationSchedule,
) -> Confirmation<Value> {
    retry_lookup(schedule, |_| client.get_transaction_block(digest, ResultOptions::inspection())).await
}

/// Locate the id of the subscription created by `digest`.
pub async fn find_created_subscription(
    client: &dyn ChainClient,
    digest: &str,
    package_id: &str,
    schedule: &ConfirmationSchedule,
) -> Confirmation<String> {
    retry_lookup(schedule, |_| async move {
        let tx = client
            .get_transaction_block(digest, ResultOptions::inspection())
            .await?;
        Ok(tx.and_then(|tx| extract_subscription_id(&tx, package_id)))
    })
    .await
}

/// Whether `object_type` is `<package_id>::subscription::Subscription`.
pub fn is_subscription_type(object_type: &str, package_id: &str) -> bool {
    let Some((address, rest)) = object_type.split_once("::") else {
        return false;
    };
    let matches_name = rest == "subscription::Subscription" || rest.starts_with("subscription::Subscription<");
    matches_name && same_address(address, package_id)
}

/// Find the subscription id in a transaction response. Tiers, in order:
/// created objects, transferred objects, shared or mutated objects, then
/// event payloads.
pub fn extract_subscription_id(tx: &Value, package_id: &str) -> Option<String> {
    let changes = parse_object_changes(tx);
    let typed = |kind: ObjectChangeKind| {
        changes
            .iter()
            .find(|c| c.kind == kind && c.object_type.as_deref().is_some_and(|t| is_subscription_type(t, package_id)))
            .map(|c| c.object_id.clone())
    };

    typed(ObjectChangeKind::Created)
        .or_else(|| typed(ObjectChangeKind::Transferred))
        .or_else(|| shared_subscription(tx, package_id))
        .or_else(|| typed(ObjectChangeKind::Mutated))
        .or_else(|| subscription_from_events(tx))
}

fn shared_subscription(tx: &Value, package_id: &str) -> Option<String> {
    tx.get("objectChanges")?
        .as_array()?
        .iter()
        .filter(|c| c.get("owner").and_then(|o| o.get("Shared")).is_some())
        .filter(|c| {
            c.get("objectType")
                .and_then(Value::as_str)
                .is_some_and(|t| is_subscription_type(t, package_id))
        })
        .find_map(|c| c.get("objectId").and_then(Value::as_str).map(String::from))
}

fn subscription_from_events(tx: &Value) -> Option<String> {
    tx.get("events")?
        .as_array()?
        .iter()
        .filter(|e| {
            e.get("type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.contains("::subscription::"))
        })
        .filter_map(|e| e.get("parsedJson"))
        .find_map(|json| {
            json.get("subscription_id")
                .or_else(|| json.get("id"))
                .and_then(Value::as_str)
                .map(String::from)
        })
}
