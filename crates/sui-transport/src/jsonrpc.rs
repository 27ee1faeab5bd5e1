//! JSON-RPC client for a Sui fullnode.
//!
//! ## Endpoints
//! - Mainnet: `https://fullnode.mainnet.sui.io:443`
//! - Testnet: `https://fullnode.testnet.sui.io:443`
//!
//! HTTP calls are blocking (`ureq`); the [`ChainClient`] impl moves them onto
//! the blocking pool so callers can await them.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use sui_subscriptions_types::ResultOptions;

use crate::client::{Balance, ChainClient, ObjectFilter};
use crate::network::Network;

/// Items per `suix_getOwnedObjects` page (server maximum).
const OWNED_OBJECTS_PAGE_SIZE: usize = 50;
/// Upper bound on pages followed for one listing.
const MAX_OWNED_OBJECT_PAGES: usize = 20;

/// JSON-RPC client for Sui fullnode queries.
#[derive(Clone)]
pub struct JsonRpcClient {
    endpoint: String,
    agent: ureq::Agent,
}

/// Error object from a JSON-RPC response.
#[derive(Debug, Clone)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

impl RpcError {
    fn is_not_found(&self) -> bool {
        let lower = self.message.to_lowercase();
        lower.contains("could not find") || lower.contains("not found")
    }
}

impl JsonRpcClient {
    /// Default request timeout in seconds (can be overridden by env).
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds (can be overridden by env).
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn default_timeouts() -> (Duration, Duration) {
        let timeout_secs = sui_subscriptions_types::env_var_or(
            "SUI_RPC_TIMEOUT_SECS",
            Self::DEFAULT_TIMEOUT_SECS,
        );
        let connect_secs = sui_subscriptions_types::env_var_or(
            "SUI_RPC_CONNECT_TIMEOUT_SECS",
            Self::DEFAULT_CONNECT_TIMEOUT_SECS,
        );
        (
            Duration::from_secs(timeout_secs),
            Duration::from_secs(connect_secs),
        )
    }

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    pub fn mainnet() -> Self {
        Self::new(Network::Mainnet.default_rpc_url())
    }

    pub fn testnet() -> Self {
        Self::new(Network::Testnet.default_rpc_url())
    }

    /// Create a client with a custom endpoint.
    pub fn new(endpoint: &str) -> Self {
        let (timeout, connect_timeout) = Self::default_timeouts();
        Self::with_timeouts(endpoint, timeout, connect_timeout)
    }

    pub fn with_timeouts(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(timeout, connect_timeout),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute one JSON-RPC call and return its `result`.
    ///
    /// RPC-level errors come back as [`RpcError`] inside the `anyhow` error so
    /// callers can downcast.
    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!(method = method, endpoint = %self.endpoint, "json-rpc call");

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("JSON-RPC request {} failed: {}", method, e))?
            .into_json()
            .with_context(|| format!("Failed to parse JSON-RPC response for {}", method))?;

        if let Some(err) = response.get("error") {
            return Err(RpcError {
                code: err.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: err
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            }
            .into());
        }

        response
            .get("result")
            .cloned()
            .ok_or_else(|| anyhow!("No result in JSON-RPC response for {}", method))
    }

    pub fn fetch_object(&self, object_id: &str, options: ResultOptions) -> Result<Option<Value>> {
        let result = self.call("sui_getObject", json!([object_id, options]))?;
        Ok(unwrap_object_response(&result))
    }

    pub fn fetch_owned_objects(
        &self,
        owner: &str,
        filter: Option<&ObjectFilter>,
        options: ResultOptions,
    ) -> Result<Vec<Value>> {
        let query = json!({ "filter": filter, "options": options });
        let listing = collect_pages(MAX_OWNED_OBJECT_PAGES, |cursor| {
            self.call(
                "suix_getOwnedObjects",
                json!([owner, query, cursor, OWNED_OBJECTS_PAGE_SIZE]),
            )
        })?;
        if listing.truncated {
            warn!(
                owner = owner,
                count = listing.objects.len(),
                max_pages = MAX_OWNED_OBJECT_PAGES,
                "owned object listing truncated at page limit"
            );
        } else {
            debug!(owner = owner, count = listing.objects.len(), "fetched owned objects");
        }
        Ok(listing.objects)
    }

    pub fn fetch_transaction_block(
        &self,
        digest: &str,
        options: ResultOptions,
    ) -> Result<Option<Value>> {
        match self.call("sui_getTransactionBlock", json!([digest, options])) {
            Ok(tx) => Ok(Some(tx)),
            Err(e) => match e.downcast_ref::<RpcError>() {
                Some(rpc) if rpc.is_not_found() => Ok(None),
                _ => Err(e),
            },
        }
    }

    pub fn fetch_balance(&self, owner: &str) -> Result<Balance> {
        let result = self.call("suix_getBalance", json!([owner]))?;
        Balance::from_value(&result)
            .ok_or_else(|| anyhow!("Malformed balance response for {}", owner))
    }
}

/// Unwrap `{data: {...}}` / `{error: {...}}` object responses.
/// Objects gathered from a paged listing.
#[derive(Debug, Default)]
struct PagedListing {
    objects: Vec<Value>,
    /// More pages remained when the page limit was reached.
    truncated: bool,
}

/// Follow `nextCursor` until the last page or `max_pages`.
fn collect_pages<F>(max_pages: usize, mut fetch_page: F) -> Result<PagedListing>
where
    F: FnMut(Option<&str>) -> Result<Value>,
{
    let mut listing = PagedListing::default();
    let mut cursor: Option<String> = None;

    for _ in 0..max_pages {
        let page = fetch_page(cursor.as_deref())?;
        if let Some(data) = page.get("data").and_then(Value::as_array) {
            listing.objects.extend(data.iter().filter_map(unwrap_object_response));
        }
        let has_next = page
            .get("hasNextPage")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        cursor = page
            .get("nextCursor")
            .and_then(Value::as_str)
            .map(String::from);
        if !has_next || cursor.is_none() {
            return Ok(listing);
        }
    }
    listing.truncated = true;
    Ok(listing)
}

fn unwrap_object_response(response: &Value) -> Option<Value> {
    response
        .get("data")
        .filter(|d| !d.is_null())
        .cloned()
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| anyhow!("blocking RPC task failed: {}", e))?
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn get_object(&self, object_id: &str, options: ResultOptions) -> Result<Option<Value>> {
        let client = self.clone();
        let id = object_id.to_string();
        blocking(move || client.fetch_object(&id, options)).await
    }

    async fn get_owned_objects(
        &self,
        owner: &str,
        filter: Option<ObjectFilter>,
        options: ResultOptions,
    ) -> Result<Vec<Value>> {
        let client = self.clone();
        let owner = owner.to_string();
        blocking(move || client.fetch_owned_objects(&owner, filter.as_ref(), options)).await
    }

    async fn get_transaction_block(
        &self,
        digest: &str,
        options: ResultOptions,
    ) -> Result<Option<Value>> {
        let client = self.clone();
        let digest = digest.to_string();
        blocking(move || client.fetch_transaction_block(&digest, options)).await
    }

    async fn get_balance(&self, owner: &str) -> Result<Balance> {
        let client = self.clone();
        let owner = owner.to_string();
        blocking(move || client.fetch_balance(&owner)).await
    }
}
