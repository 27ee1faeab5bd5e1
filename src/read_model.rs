//! Subscription read model.
//!
//! [`format`] turns a raw object record (as returned by `sui_getObject` or
//! `suix_getOwnedObjects`) into a [`SubscriptionRecord`]. It is total: any
//! missing or malformed field becomes a sentinel instead of an error.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use sui_subscriptions_types::address::same_address;

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_TOKEN: &str = "SUI";

/// Decimals of the SUI coin.
pub const SUI_DECIMALS: u32 = 9;

/// Millisecond timestamps are at least this large; smaller values are seconds.
const MILLIS_THRESHOLD: u64 = 1_000_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalClass {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Unknown,
}

/// Classification buckets in seconds, smallest first. Anything above 1.5x
/// the last bucket is yearly.
const INTERVAL_BUCKETS: [(IntervalClass, u64); 5] = [
    (IntervalClass::Hourly, 3_600),
    (IntervalClass::Daily, 86_400),
    (IntervalClass::Weekly, 604_800),
    (IntervalClass::Monthly, 2_592_000),
    (IntervalClass::Quarterly, 7_776_000),
];

impl IntervalClass {
    pub fn from_seconds(seconds: u64) -> Self {
        if seconds == 0 {
            return IntervalClass::Unknown;
        }
        INTERVAL_BUCKETS
            .iter()
            // seconds <= 1.5 * bucket, in integers
            .find(|(_, bucket)| seconds.saturating_mul(2) <= bucket * 3)
            .map(|(class, _)| *class)
            .unwrap_or(IntervalClass::Yearly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalClass::Hourly => "hourly",
            IntervalClass::Daily => "daily",
            IntervalClass::Weekly => "weekly",
            IntervalClass::Monthly => "monthly",
            IntervalClass::Quarterly => "quarterly",
            IntervalClass::Yearly => "yearly",
            IntervalClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntervalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
        })
    }
}

/// Display-ready view of an on-chain `Subscription` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub id: String,
    pub merchant: String,
    /// Minor units (MIST for SUI).
    pub amount: u64,
    pub token: String,
    pub interval: IntervalClass,
    pub interval_secs: u64,
    /// `YYYY-MM-DD`, or "Unknown".
    pub next_payment: String,
    pub status: SubscriptionStatus,
    pub payments_made: u64,
}

impl SubscriptionRecord {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Amount in whole coins, e.g. "1.5 SUI".
    pub fn display_amount(&self) -> String {
        format!("{} {}", format_minor_units(self.amount, SUI_DECIMALS), self.token)
    }
}

/// Build a record from a raw object. Never fails.
pub fn format(raw: &Value) -> SubscriptionRecord {
    // `sui_getObject` wraps the object in `data`.
    let object = raw.get("data").filter(|d| d.is_object()).unwrap_or(raw);
    let fields = object.get("content").and_then(|c| c.get("fields"));
    let field = |name: &str| fields.and_then(|f| f.get(name));

    let id = object
        .get("objectId")
        .and_then(Value::as_str)
        .or_else(|| field("id").and_then(|v| v.get("id")).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();

    let merchant = field("merchant")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string();

    let interval_secs = field("interval_secs").map(parse_u64).unwrap_or(0);
    let active = field("status")
        .and_then(|s| s.get("fields").and_then(|f| f.get("active")).or_else(|| s.get("active")))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    SubscriptionRecord {
        id,
        merchant,
        amount: field("amount").map(parse_u64).unwrap_or(0),
        token: DEFAULT_TOKEN.to_string(),
        interval: IntervalClass::from_seconds(interval_secs),
        interval_secs,
        next_payment: format_date(field("next_payment_time").map(parse_u64).unwrap_or(0)),
        status: if active {
            SubscriptionStatus::Active
        } else {
            SubscriptionStatus::Inactive
        },
        payments_made: field("payment_count").map(parse_u64).unwrap_or(0),
    }
}

/// Records whose merchant is `merchant`.
pub fn merchant_view<'a>(
    records: impl IntoIterator<Item = &'a SubscriptionRecord>,
    merchant: &str,
) -> Vec<SubscriptionRecord> {
    records
        .into_iter()
        .filter(|r| r.merchant != UNKNOWN && same_address(&r.merchant, merchant))
        .cloned()
        .collect()
}

/// Chain integers arrive as strings or numbers; anything else is 0.
fn parse_u64(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Seconds or milliseconds since the epoch to `YYYY-MM-DD`.
pub fn format_date(timestamp: u64) -> String {
    if timestamp == 0 {
        return UNKNOWN.to_string();
    }
    let parsed = if timestamp >= MILLIS_THRESHOLD {
        i64::try_from(timestamp)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    } else {
        i64::try_from(timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    };
    parsed
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// `1_500_000_000` with 9 decimals is "1.5".
pub fn format_minor_units(amount: u64, decimals: u32) -> String {
    let scale = 10u64.pow(decimals);
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
