//! Subscription contract client.
//!
//! Builds the Move calls of the external `subscription` module, runs them
//! through the [`TransactionExecutor`] and reads subscriptions back. Each
//! action runs validate, build, dispatch, then persist-on-success, and a
//! second copy of an action that is still in flight is rejected.
//!
//! | Action | Move function | Arguments |
//! |--------|---------------|-----------|
//! | create | `create_subscription` | merchant, amount, interval_secs, clock |
//! | pay | `execute_payment` | subscription, split-gas coin(amount), clock |
//! | pause | `pause_subscription` | subscription |
//! | resume | `resume_subscription` | subscription |
//! | cancel | `cancel_subscription` | subscription |

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use sui_subscriptions_transport::{Balance, ChainClient, ObjectFilter};
use sui_subscriptions_types::address::CLOCK_OBJECT_ID;
use sui_subscriptions_types::{
    normalize_address_checked, CallArg, ConfirmationSchedule, MoveCallTarget, ResultOptions,
    TransactionRequest, TransactionResult,
};

use crate::confirm::{extract_subscription_id, find_created_subscription, Confirmation};
use crate::read_model::{self, merchant_view, SubscriptionRecord, SUI_DECIMALS};
use crate::storage::TransactionHistory;
use crate::wallet::{TransactionExecutor, WalletError, WalletHandle};

pub const MODULE: &str = "subscription";
pub const SUBSCRIPTION_STRUCT: &str = "Subscription";

const SECONDS_PER_DAY: u64 = 86_400;

/// Interval names accepted by [`interval_to_seconds`].
pub const INTERVAL_NAMES: [(&str, u64); 5] = [
    ("daily", SECONDS_PER_DAY),
    ("weekly", 7 * SECONDS_PER_DAY),
    ("monthly", 30 * SECONDS_PER_DAY),
    ("quarterly", 90 * SECONDS_PER_DAY),
    ("yearly", 365 * SECONDS_PER_DAY),
];

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ContractError {
    InvalidAddress { field: &'static str, value: String },
    InvalidAmount(String),
    InvalidInterval(u64),
    /// The same action is already being dispatched.
    ActionInProgress(String),
    Wallet(WalletError),
    /// The wallet answered without a digest; the submission state is unknown.
    MissingDigest(Option<String>),
    /// Submitted, but the transaction failed on chain.
    ExecutionFailed { digest: String, error: String },
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::InvalidAddress { field, value } => {
                write!(f, "invalid {} address '{}'", field, value)
            }
            ContractError::InvalidAmount(msg) => write!(f, "invalid amount: {}", msg),
            ContractError::InvalidInterval(secs) => write!(f, "invalid interval: {} seconds", secs),
            ContractError::ActionInProgress(key) => write!(f, "action already in progress: {}", key),
            ContractError::Wallet(err) => write!(f, "{}", err),
            ContractError::MissingDigest(detail) => write!(
                f,
                "wallet returned no transaction digest{}",
                detail.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default()
            ),
            ContractError::ExecutionFailed { digest, error } => {
                write!(f, "transaction {} failed: {}", digest, error)
            }
        }
    }
}

impl std::error::Error for ContractError {}

impl From<WalletError> for ContractError {
    fn from(err: WalletError) -> Self {
        ContractError::Wallet(err)
    }
}

// =============================================================================
// Validation and unit conversion
// =============================================================================

pub fn validate_address(field: &'static str, value: &str) -> Result<String, ContractError> {
    normalize_address_checked(value).ok_or_else(|| ContractError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

/// Convert a decimal coin amount ("1.25") to minor units. Done once, before
/// the request is built.
pub fn to_minor_units(amount: &str, decimals: u32) -> Result<u64, ContractError> {
    let amount = amount.trim();
    let invalid = |why: &str| ContractError::InvalidAmount(format!("'{}' {}", amount, why));
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid("is empty"));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("is not a positive decimal number"));
    }
    if frac.len() > decimals as usize {
        return Err(invalid(&format!("has more than {} decimal places", decimals)));
    }
    let scale = 10u64.pow(decimals);
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("is too large"))?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse()
            .map_err(|_| invalid("is too large"))?
    };
    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| invalid("is too large"))
}

/// SUI amount to MIST.
pub fn sui_to_mist(amount: &str) -> Result<u64, ContractError> {
    to_minor_units(amount, SUI_DECIMALS)
}

/// Interval name to seconds. Unknown names mean monthly.
pub fn interval_to_seconds(name: &str) -> u64 {
    let name = name.trim().to_lowercase();
    INTERVAL_NAMES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, secs)| *secs)
        .unwrap_or(30 * SECONDS_PER_DAY)
}

/// Expected next payment time for a subscription created now.
pub fn estimated_next_payment(interval_secs: u64) -> Option<DateTime<Utc>> {
    let interval = chrono::Duration::try_seconds(i64::try_from(interval_secs).ok()?)?;
    Utc::now().checked_add_signed(interval)
}

// =============================================================================
// Request builders
// =============================================================================

fn target(package_id: &str, function: &str) -> MoveCallTarget {
    MoveCallTarget::new(package_id, MODULE, function)
}

pub fn subscription_type(package_id: &str) -> String {
    format!("{}::{}::{}", package_id, MODULE, SUBSCRIPTION_STRUCT)
}

pub fn create_subscription_request(
    package_id: &str,
    merchant: &str,
    amount: u64,
    interval_secs: u64,
) -> Result<TransactionRequest, ContractError> {
    let merchant = validate_address("merchant", merchant)?;
    if amount == 0 {
        return Err(ContractError::InvalidAmount("amount must be greater than zero".into()));
    }
    if interval_secs == 0 {
        return Err(ContractError::InvalidInterval(interval_secs));
    }
    Ok(TransactionRequest::new(
        target(package_id, "create_subscription"),
        vec![
            CallArg::Address(merchant),
            CallArg::U64(amount),
            CallArg::U64(interval_secs),
            CallArg::Object(CLOCK_OBJECT_ID.to_string()),
        ],
    )
    .with_shared_object(CLOCK_OBJECT_ID))
}

pub fn execute_payment_request(
    package_id: &str,
    subscription_id: &str,
    amount: u64,
) -> Result<TransactionRequest, ContractError> {
    let id = validate_address("subscription", subscription_id)?;
    if amount == 0 {
        return Err(ContractError::InvalidAmount("amount must be greater than zero".into()));
    }
    Ok(TransactionRequest::new(
        target(package_id, "execute_payment"),
        vec![
            CallArg::Object(id),
            CallArg::SplitGas(amount),
            CallArg::Object(CLOCK_OBJECT_ID.to_string()),
        ],
    )
    .with_shared_object(CLOCK_OBJECT_ID))
}

fn single_object_request(
    package_id: &str,
    function: &str,
    subscription_id: &str,
) -> Result<TransactionRequest, ContractError> {
    let id = validate_address("subscription", subscription_id)?;
    Ok(TransactionRequest::new(
        target(package_id, function),
        vec![CallArg::Object(id)],
    ))
}

pub fn pause_subscription_request(package_id: &str, subscription_id: &str) -> Result<TransactionRequest, ContractError> {
    single_object_request(package_id, "pause_subscription", subscription_id)
}

pub fn resume_subscription_request(package_id: &str, subscription_id: &str) -> Result<TransactionRequest, ContractError> {
    single_object_request(package_id, "resume_subscription", subscription_id)
}

pub fn cancel_subscription_request(package_id: &str, subscription_id: &str) -> Result<TransactionRequest, ContractError> {
    single_object_request(package_id, "cancel_subscription", subscription_id)
}

// =============================================================================
// Service
// =============================================================================

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub result: TransactionResult,
    /// Only for create: where the new subscription id lookup ended.
    pub created: Option<Confirmation<String>>,
    /// Only for a submitted create: first payment due, counted from now.
    pub estimated_next_payment: Option<DateTime<Utc>>,
}

impl ActionOutcome {
    fn new(result: TransactionResult) -> Self {
        Self {
            result,
            created: None,
            estimated_next_payment: None,
        }
    }

    pub fn digest(&self) -> Option<&str> {
        self.result.digest.as_deref()
    }

    pub fn created_id(&self) -> Option<&str> {
        self.created.as_ref().and_then(|c| c.value()).map(String::as_str)
    }
}

/// Removes its key from the in-flight set when dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.key);
    }
}

pub struct SubscriptionService {
    client: Arc<dyn ChainClient>,
    executor: TransactionExecutor,
    history: TransactionHistory,
    package_id: String,
    schedule: ConfirmationSchedule,
    in_flight: Mutex<HashSet<String>>,
}

impl SubscriptionService {
    pub fn new(
        client: Arc<dyn ChainClient>,
        executor: TransactionExecutor,
        history: TransactionHistory,
        package_id: &str,
    ) -> Self {
        Self {
            client,
            executor,
            history,
            package_id: package_id.to_string(),
            schedule: ConfirmationSchedule::default(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_schedule(mut self, schedule: ConfirmationSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    pub fn history(&self) -> &TransactionHistory {
        &self.history
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.lock().contains(key)
    }

    fn begin(&self, key: String) -> Result<InFlightGuard<'_>, ContractError> {
        let mut set = self.in_flight.lock();
        if !set.insert(key.clone()) {
            return Err(ContractError::ActionInProgress(key));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            key,
        })
    }

    pub async fn create_subscription(
        &self,
        wallet: Option<&WalletHandle>,
        merchant: &str,
        amount: u64,
        interval_secs: u64,
    ) -> Result<ActionOutcome, ContractError> {
        let merchant_id = validate_address("merchant", merchant)?;
        let _guard = self.begin(format!("create:{}:{}:{}", merchant_id, amount, interval_secs))?;
        let request = create_subscription_request(&self.package_id, merchant, amount, interval_secs)?;
        let result = self.dispatch(wallet, request, ResultOptions::effects_and_changes()).await?;

        let Some(digest) = result.digest.clone() else {
            // Signed only; nothing to confirm.
            return Ok(ActionOutcome::new(result));
        };
        let created = match extract_subscription_id(&result.raw, &self.package_id) {
            Some(id) => Confirmation::Confirmed { value: id, attempts: 0 },
            None => find_created_subscription(self.client.as_ref(), &digest, &self.package_id, &self.schedule).await,
        };
        let next_payment = estimated_next_payment(interval_secs);
        match created.value() {
            Some(id) => {
                info!(
                    subscription = %id,
                    digest = %digest,
                    next_payment = ?next_payment,
                    "subscription created"
                );
                self.history.record_created(id, Some(&digest));
            }
            None => warn!(digest = %digest, "created subscription not found yet"),
        }
        Ok(ActionOutcome {
            result,
            created: Some(created),
            estimated_next_payment: next_payment,
        })
    }

    pub async fn execute_payment(
        &self,
        wallet: Option<&WalletHandle>,
        subscription_id: &str,
        amount: u64,
    ) -> Result<ActionOutcome, ContractError> {
        let _guard = self.begin(action_key("pay", subscription_id))?;
        let request = execute_payment_request(&self.package_id, subscription_id, amount)?;
        let result = self.dispatch(wallet, request, ResultOptions::effects_and_changes()).await?;
        Ok(ActionOutcome::new(result))
    }

    pub async fn pause_subscription(
        &self,
        wallet: Option<&WalletHandle>,
        subscription_id: &str,
    ) -> Result<ActionOutcome, ContractError> {
        let _guard = self.begin(action_key("pause", subscription_id))?;
        let request = pause_subscription_request(&self.package_id, subscription_id)?;
        let result = self.dispatch(wallet, request, ResultOptions::effects()).await?;
        Ok(ActionOutcome::new(result))
    }

    pub async fn resume_subscription(
        &self,
        wallet: Option<&WalletHandle>,
        subscription_id: &str,
    ) -> Result<ActionOutcome, ContractError> {
        let _guard = self.begin(action_key("resume", subscription_id))?;
        let request = resume_subscription_request(&self.package_id, subscription_id)?;
        let result = self.dispatch(wallet, request, ResultOptions::effects()).await?;
        Ok(ActionOutcome::new(result))
    }

    pub async fn cancel_subscription(
        &self,
        wallet: Option<&WalletHandle>,
        subscription_id: &str,
    ) -> Result<ActionOutcome, ContractError> {
        let _guard = self.begin(action_key("cancel", subscription_id))?;
        let request = cancel_subscription_request(&self.package_id, subscription_id)?;
        let result = self.dispatch(wallet, request, ResultOptions::effects()).await?;
        Ok(ActionOutcome::new(result))
    }

    /// Dispatch and record the digest of a successful submission.
    async fn dispatch(
        &self,
        wallet: Option<&WalletHandle>,
        request: TransactionRequest,
        options: ResultOptions,
    ) -> Result<TransactionResult, ContractError> {
        let result = self.executor.execute(wallet, request, options).await?;
        if result.signed.is_some() {
            return Ok(result);
        }
        match (&result.digest, result.success) {
            (Some(digest), true) => {
                self.history.record_transaction(digest);
                Ok(result)
            }
            (Some(digest), false) => Err(ContractError::ExecutionFailed {
                digest: digest.clone(),
                error: result.error.clone().unwrap_or_default(),
            }),
            (None, _) => Err(ContractError::MissingDigest(result.error.clone())),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Subscriptions owned by `owner`.
    pub async fn subscriptions_for(&self, owner: &str) -> Result<Vec<SubscriptionRecord>> {
        let objects = self
            .client
            .get_owned_objects(
                owner,
                Some(ObjectFilter::StructType(subscription_type(&self.package_id))),
                ResultOptions::object_content(),
            )
            .await?;
        Ok(objects.iter().map(read_model::format).collect())
    }

    pub async fn subscription(&self, id: &str) -> Result<Option<SubscriptionRecord>> {
        let object = self.client.get_object(id, ResultOptions::object_content()).await?;
        Ok(object.as_ref().map(read_model::format))
    }

    /// Subscriptions paying `merchant`, gathered from the given subscribers'
    /// objects and the locally recorded created subscriptions.
    pub async fn merchant_subscriptions(
        &self,
        merchant: &str,
        subscribers: &[String],
    ) -> Result<Vec<SubscriptionRecord>> {
        let mut records = Vec::new();
        for subscriber in subscribers {
            records.extend(self.subscriptions_for(subscriber).await?);
        }
        for created in self.history.created_subscriptions() {
            match self.subscription(&created.id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => warn!(id = %created.id, error = %err, "skipping recorded subscription"),
            }
        }
        let mut seen = HashSet::new();
        records.retain(|r| seen.insert(r.id.clone()));
        Ok(merchant_view(&records, merchant))
    }

    pub async fn balance(&self, owner: &str) -> Result<Balance> {
        self.client.get_balance(owner).await
    }
}

fn action_key(action: &str, subscription_id: &str) -> String {
    let id = normalize_address_checked(subscription_id).unwrap_or_else(|| subscription_id.to_string());
    format!("{}:{}", action, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PKG: &str = "0x177d";

    #[test]
    fn test_to_minor_units() {
        assert_eq!(sui_to_mist("1").unwrap(), 1_000_000_000);
        assert_eq!(sui_to_mist("1.5").unwrap(), 1_500_000_000);
        assert_eq!(sui_to_mist("0.000000001").unwrap(), 1);
        assert_eq!(sui_to_mist(".25").unwrap(), 250_000_000);
        assert!(sui_to_mist("0.0000000001").is_err());
        assert!(sui_to_mist("-1").is_err());
        assert!(sui_to_mist("").is_err());
        assert!(sui_to_mist("abc").is_err());
        assert!(sui_to_mist("99999999999999999999").is_err());
    }

    #[test]
    fn test_interval_to_seconds() {
        assert_eq!(interval_to_seconds("daily"), 86_400);
        assert_eq!(interval_to_seconds("Weekly"), 604_800);
        assert_eq!(interval_to_seconds("quarterly"), 7_776_000);
        assert_eq!(interval_to_seconds("yearly"), 31_536_000);
        assert_eq!(interval_to_seconds("fortnightly"), 2_592_000);
    }

    #[test]
    fn test_create_request_shape() {
        let req = create_subscription_request(PKG, "0xbeef", 5, 86_400).unwrap();
        assert_eq!(req.target().to_string(), "0x177d::subscription::create_subscription");
        assert_eq!(req.arguments().len(), 4);
        assert!(matches!(&req.arguments()[0], CallArg::Address(a) if a.ends_with("beef") && a.len() == 66));
        assert_eq!(req.arguments()[1], CallArg::U64(5));
        assert_eq!(req.shared_objects(), [CLOCK_OBJECT_ID.to_string()]);
    }

    #[test]
    fn test_create_request_validation() {
        assert!(matches!(
            create_subscription_request(PKG, "merchant", 5, 86_400),
            Err(ContractError::InvalidAddress { field: "merchant", .. })
        ));
        assert!(matches!(
            create_subscription_request(PKG, "0xbeef", 0, 86_400),
            Err(ContractError::InvalidAmount(_))
        ));
        assert_eq!(
            create_subscription_request(PKG, "0xbeef", 5, 0).unwrap_err(),
            ContractError::InvalidInterval(0)
        );
    }

    #[test]
    fn test_payment_request_splits_gas() {
        let req = execute_payment_request(PKG, "0x51", 42).unwrap();
        assert_eq!(req.arguments()[1], CallArg::SplitGas(42));
        assert_eq!(req.target().function, "execute_payment");
    }

    #[test]
    fn test_single_object_requests() {
        for (req, function) in [
            (pause_subscription_request(PKG, "0x51").unwrap(), "pause_subscription"),
            (resume_subscription_request(PKG, "0x51").unwrap(), "resume_subscription"),
            (cancel_subscription_request(PKG, "0x51").unwrap(), "cancel_subscription"),
        ] {
            assert_eq!(req.target().function, function);
            assert_eq!(req.arguments().len(), 1);
        }
        assert!(pause_subscription_request(PKG, "not-an-id").is_err());
    }

    #[test]
    fn test_estimated_next_payment_is_in_future() {
        assert!(estimated_next_payment(86_400).unwrap() > Utc::now());
        assert_eq!(estimated_next_payment(u64::MAX), None);
    }
}
