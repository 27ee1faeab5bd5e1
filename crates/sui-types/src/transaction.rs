//! Wallet-facing transaction types.
//!
//! A [`TransactionRequest`] is the unsigned Move call handed to a wallet; a
//! [`TransactionResult`] is what comes back, normalized from whichever response
//! shape the wallet produced.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Fully qualified Move function: `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveCallTarget {
    pub package: String,
    pub module: String,
    pub function: String,
}

impl MoveCallTarget {
    pub fn new(package: &str, module: &str, function: &str) -> Self {
        Self {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
        }
    }
}

impl fmt::Display for MoveCallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

impl FromStr for MoveCallTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split("::").collect();
        match parts.as_slice() {
            [package, module, function]
                if !package.is_empty() && !module.is_empty() && !function.is_empty() =>
            {
                Ok(Self::new(package, module, function))
            }
            _ => Err(anyhow!(
                "invalid Move call target '{}': expected package::module::function",
                s
            )),
        }
    }
}

/// One positional argument of a Move call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// Pure address value.
    Address(String),
    /// Pure u64 value, always in minor units for amounts.
    U64(u64),
    /// Object reference by id.
    Object(String),
    /// A coin of the given minor-unit amount split from the gas coin.
    SplitGas(u64),
}

/// Unsigned, fully parameterized contract call.
///
/// Fields are private; a request cannot change after it is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    target: MoveCallTarget,
    arguments: Vec<CallArg>,
    shared_objects: Vec<String>,
}

impl TransactionRequest {
    pub fn new(target: MoveCallTarget, arguments: Vec<CallArg>) -> Self {
        Self {
            target,
            arguments,
            shared_objects: Vec::new(),
        }
    }

    /// Declare an argument object as shared.
    pub fn with_shared_object(mut self, object_id: &str) -> Self {
        if !self.shared_objects.iter().any(|id| id == object_id) {
            self.shared_objects.push(object_id.to_string());
        }
        self
    }

    pub fn target(&self) -> &MoveCallTarget {
        &self.target
    }

    pub fn arguments(&self) -> &[CallArg] {
        &self.arguments
    }

    pub fn shared_objects(&self) -> &[String] {
        &self.shared_objects
    }

    /// Ids of every object the call touches, in argument order.
    pub fn object_ids(&self) -> Vec<&str> {
        self.arguments
            .iter()
            .filter_map(|arg| match arg {
                CallArg::Object(id) => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Which response sections the chain should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultOptions {
    #[serde(default)]
    pub show_content: bool,
    #[serde(default)]
    pub show_type: bool,
    #[serde(default)]
    pub show_effects: bool,
    #[serde(default)]
    pub show_events: bool,
    #[serde(default)]
    pub show_object_changes: bool,
}

impl ResultOptions {
    /// Effects only; used by pause/resume/cancel.
    pub fn effects() -> Self {
        Self {
            show_effects: true,
            ..Self::default()
        }
    }

    /// Effects plus object changes; used by create and payment.
    pub fn effects_and_changes() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
            ..Self::default()
        }
    }

    /// Everything needed to locate objects created by a transaction.
    pub fn inspection() -> Self {
        Self {
            show_effects: true,
            show_events: true,
            show_object_changes: true,
            ..Self::default()
        }
    }

    /// Content and type; used for object reads.
    pub fn object_content() -> Self {
        Self {
            show_content: true,
            show_type: true,
            ..Self::default()
        }
    }
}

/// Output of a wallet signing call that did not submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    /// Base64 transaction bytes.
    pub bytes: String,
    pub signature: String,
}

impl SignedTransaction {
    /// Extract `{bytes, signature}` from a raw wallet response.
    pub fn from_value(value: &Value) -> Option<Self> {
        let bytes = value
            .get("bytes")
            .or_else(|| value.get("transactionBlockBytes"))
            .and_then(Value::as_str)?;
        let signature = value.get("signature").and_then(Value::as_str)?;
        Some(Self {
            bytes: bytes.to_string(),
            signature: signature.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectChangeKind {
    Created,
    Mutated,
    Transferred,
    Deleted,
    Wrapped,
    Published,
    Other,
}

impl ObjectChangeKind {
    fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "mutated" => Self::Mutated,
            "transferred" => Self::Transferred,
            "deleted" => Self::Deleted,
            "wrapped" => Self::Wrapped,
            "published" => Self::Published,
            _ => Self::Other,
        }
    }
}

/// Object touched by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectChange {
    pub kind: ObjectChangeKind,
    pub object_id: String,
    pub object_type: Option<String>,
}

impl ObjectChange {
    /// Parse one entry of a response's `objectChanges` array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let kind = ObjectChangeKind::parse(value.get("type").and_then(Value::as_str)?);
        let object_id = value
            .get("objectId")
            .or_else(|| value.get("packageId"))
            .and_then(Value::as_str)?;
        Some(Self {
            kind,
            object_id: object_id.to_string(),
            object_type: value
                .get("objectType")
                .and_then(Value::as_str)
                .map(String::from),
        })
    }

    /// Whether the object's type contains `type_fragment`.
    pub fn has_type(&self, type_fragment: &str) -> bool {
        self.object_type
            .as_deref()
            .is_some_and(|t| t.contains(type_fragment))
    }
}

/// Parse every object change a transaction response reports.
///
/// `objectChanges` is preferred; when absent, the `created`/`mutated` lists
/// of the effects are used (these carry no types).
pub fn parse_object_changes(response: &Value) -> Vec<ObjectChange> {
    if let Some(changes) = response.get("objectChanges").and_then(Value::as_array) {
        return changes.iter().filter_map(ObjectChange::from_value).collect();
    }

    let mut out = Vec::new();
    let Some(effects) = response.get("effects") else {
        return out;
    };
    for (field, kind) in [
        ("created", ObjectChangeKind::Created),
        ("mutated", ObjectChangeKind::Mutated),
    ] {
        for entry in effects.get(field).and_then(Value::as_array).into_iter().flatten() {
            let id = entry
                .get("reference")
                .and_then(|r| r.get("objectId"))
                .and_then(Value::as_str);
            if let Some(id) = id {
                out.push(ObjectChange {
                    kind,
                    object_id: id.to_string(),
                    object_type: None,
                });
            }
        }
    }
    out
}

/// Normalized outcome of a dispatched transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Present only when the chain acknowledged the submission.
    pub digest: Option<String>,
    pub success: bool,
    pub object_changes: Vec<ObjectChange>,
    pub error: Option<String>,
    /// Set when the wallet only signed.
    pub signed: Option<SignedTransaction>,
    /// The wallet's response as received.
    pub raw: Value,
}

impl TransactionResult {
    /// Normalize a sign-and-execute style response.
    pub fn from_response(raw: Value) -> Self {
        let digest = raw
            .get("digest")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .map(String::from);

        let status = raw
            .get("effects")
            .and_then(|e| e.get("status"))
            .and_then(|s| s.get("status"))
            .and_then(Value::as_str);
        let failed = matches!(status, Some(s) if s != "success");

        let error = if failed {
            Some(
                raw.get("effects")
                    .and_then(|e| e.get("status"))
                    .and_then(|s| s.get("error"))
                    .and_then(Value::as_str)
                    .unwrap_or("transaction execution failed")
                    .to_string(),
            )
        } else if let Some(msg) = first_error_message(&raw) {
            Some(msg)
        } else if digest.is_none() {
            Some("wallet response contained no transaction digest".to_string())
        } else {
            None
        };

        Self {
            success: digest.is_some() && error.is_none(),
            object_changes: parse_object_changes(&raw),
            digest,
            error,
            signed: None,
            raw,
        }
    }

    /// A transaction that was signed but not submitted.
    pub fn signed_only(signed: SignedTransaction, raw: Value) -> Self {
        Self {
            digest: None,
            success: false,
            object_changes: Vec::new(),
            error: Some("transaction signed but not submitted".to_string()),
            signed: Some(signed),
            raw,
        }
    }

    /// True when the wallet answered without a digest. Callers must not treat
    /// this as success.
    pub fn is_missing_digest(&self) -> bool {
        self.digest.is_none()
    }

    pub fn created(&self) -> impl Iterator<Item = &ObjectChange> {
        self.object_changes
            .iter()
            .filter(|c| c.kind == ObjectChangeKind::Created)
    }
}

fn first_error_message(raw: &Value) -> Option<String> {
    raw.get("errors")
        .and_then(Value::as_array)
        .and_then(|errs| errs.first())
        .map(|e| match e.as_str() {
            Some(s) => s.to_string(),
            None => e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_call_target_parse() {
        let target: MoveCallTarget = "0xabc::subscription::create_subscription".parse().unwrap();
        assert_eq!(target.module, "subscription");
        assert_eq!(
            target.to_string(),
            "0xabc::subscription::create_subscription"
        );
        assert!("0xabc::subscription".parse::<MoveCallTarget>().is_err());
        assert!("0xabc::::f".parse::<MoveCallTarget>().is_err());
    }

    #[test]
    fn test_request_object_ids_and_shared() {
        let request = TransactionRequest::new(
            MoveCallTarget::new("0x1", "subscription", "execute_payment"),
            vec![
                CallArg::Object("0xsub".into()),
                CallArg::SplitGas(5),
                CallArg::Object("0x6".into()),
            ],
        )
        .with_shared_object("0x6")
        .with_shared_object("0x6");

        assert_eq!(request.object_ids(), vec!["0xsub", "0x6"]);
        assert_eq!(request.shared_objects(), ["0x6".to_string()]);
    }

    #[test]
    fn test_result_options_serialize_camel_case() {
        let v = serde_json::to_value(ResultOptions::effects_and_changes()).unwrap();
        assert_eq!(v["showEffects"], json!(true));
        assert_eq!(v["showObjectChanges"], json!(true));
        assert_eq!(v["showEvents"], json!(false));
    }

    #[test]
    fn test_result_with_digest_is_success() {
        let result = TransactionResult::from_response(json!({ "digest": "0xDEAD" }));
        assert_eq!(result.digest.as_deref(), Some("0xDEAD"));
        assert!(result.success);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_result_without_digest_is_anomaly() {
        let result = TransactionResult::from_response(json!({ "effects": {} }));
        assert!(result.is_missing_digest());
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[test]
    fn test_result_failed_effects() {
        let result = TransactionResult::from_response(json!({
            "digest": "D1",
            "effects": { "status": { "status": "failure", "error": "MoveAbort(..., 3)" } }
        }));
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("MoveAbort(..., 3)"));
    }

    #[test]
    fn test_object_changes_from_effects_fallback() {
        let changes = parse_object_changes(&json!({
            "effects": {
                "created": [ { "reference": { "objectId": "0x10" } } ],
                "mutated": [ { "reference": { "objectId": "0x11" } } ]
            }
        }));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind, ObjectChangeKind::Created);
        assert_eq!(changes[1].object_id, "0x11");
    }

    #[test]
    fn test_object_change_type_match() {
        let result = TransactionResult::from_response(json!({
            "digest": "D2",
            "objectChanges": [
                { "type": "mutated", "objectId": "0xgas", "objectType": "0x2::coin::Coin<0x2::sui::SUI>" },
                { "type": "created", "objectId": "0xsub", "objectType": "0xpkg::subscription::Subscription" }
            ]
        }));
        let created: Vec<_> = result.created().collect();
        assert_eq!(created.len(), 1);
        assert!(created[0].has_type("::subscription::Subscription"));
    }

    #[test]
    fn test_signed_transaction_from_value() {
        let signed = SignedTransaction::from_value(&json!({
            "transactionBlockBytes": "AAEC",
            "signature": "sig"
        }))
        .unwrap();
        assert_eq!(signed.bytes, "AAEC");
        assert!(SignedTransaction::from_value(&json!({ "bytes": "AAEC" })).is_none());
    }
}
