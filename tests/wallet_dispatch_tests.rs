//! Wallet dispatch integration tests.
//!
//! Drives [`TransactionExecutor`] against scripted wallet shapes and checks
//! which entry point each shape reaches and how its answer is normalized.
//!
//! Run with: cargo test --test wallet_dispatch_tests

mod common;

use serde_json::json;

use common::*;
use sui_subscriptions::contract::create_subscription_request;
use sui_subscriptions::wallet::{
    describe_wallet, probe, DispatchPath, ExecuteRequestType, FailureCategory, TransactionExecutor,
    VendorQuirk, WalletCallError, WalletError, WalletHandle,
};
use sui_subscriptions_transport::NetworkInfo;
use sui_subscriptions_types::{ResultOptions, TransactionRequest};

const MERCHANT: &str = "0xbeef";

fn request() -> TransactionRequest {
    create_subscription_request(PACKAGE, MERCHANT, 1_000_000_000, 86_400).unwrap()
}

fn executor() -> TransactionExecutor {
    TransactionExecutor::new(NetworkInfo::default())
}

// =============================================================================
// Path Selection
// =============================================================================

#[tokio::test]
async fn test_standard_wallet_calls_sign_and_execute_once() {
    let (wallet, imp) = standard_wallet("Suiet", SUBSCRIBER, json!({
        "digest": "8JTTaAbc",
        "effects": { "status": { "status": "success" } }
    }));

    let result = assert_ok(
        executor().execute(Some(&wallet), request(), ResultOptions::effects()).await,
        "standard dispatch",
    );

    assert_eq!(imp.call_count(), 1);
    assert_eq!(result.digest.as_deref(), Some("8JTTaAbc"));
    assert!(result.success);
    let call = &imp.calls.lock()[0];
    assert_eq!(call.chain, None, "non-quirk wallets get no explicit chain");
    assert_eq!(call.account.address, SUBSCRIBER);
}

#[tokio::test]
async fn test_each_call_uses_exactly_one_entry_point() {
    // Standard and adapter both present: only standard is used.
    let standard = MockSignAndExecute::ok(json!({ "digest": "AAA" }));
    let adapter = MockSignAndExecute::ok(json!({ "digest": "BBB" }));
    let signer = MockSigner::new();
    let wallet = WalletHandle::new("Everything Wallet")
        .with_account(SUBSCRIBER)
        .with_sign_and_execute(standard.clone())
        .with_adapter(adapter.clone())
        .with_sign(signer.clone());

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert_eq!(result.digest.as_deref(), Some("AAA"));
    assert_eq!(
        (standard.call_count(), adapter.call_count(), signer.call_count()),
        (1, 0, 0)
    );
}

#[tokio::test]
async fn test_adapter_wallet_uses_adapter() {
    let adapter = MockSignAndExecute::ok(json!({ "digest": "CCC" }));
    let wallet = WalletHandle::new("Legacy Wallet")
        .with_account(SUBSCRIBER)
        .with_adapter(adapter.clone());

    let path = executor().select_path(Some(&wallet)).unwrap();
    assert_eq!(path, DispatchPath::Adapter);

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();
    assert_eq!(result.digest.as_deref(), Some("CCC"));
    assert_eq!(adapter.call_count(), 1);
}

// =============================================================================
// Vendor Quirk
// =============================================================================

#[tokio::test]
async fn test_slush_signs_with_explicit_chain_then_executes() {
    let (wallet, signer, exec) = slush_wallet(
        SUBSCRIBER,
        json!({ "digest": "SLUSH1", "effects": { "status": { "status": "success" } } }),
    );

    let report = probe(Some(&wallet));
    assert_eq!(report.vendor_quirk, Some(VendorQuirk::ExplicitChainId));
    assert_eq!(
        report.dispatch_path(),
        Some(DispatchPath::VendorQuirk(VendorQuirk::ExplicitChainId))
    );

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects_and_changes())
        .await
        .unwrap();

    assert_eq!(signer.call_count(), 1);
    assert_eq!(exec.call_count(), 1);
    assert_eq!(signer.calls.lock()[0].chain.as_deref(), Some("sui:testnet"));
    let exec_call = &exec.calls.lock()[0];
    assert_eq!(exec_call.request_type, ExecuteRequestType::WaitForEffectsCert);
    assert_eq!(exec_call.signed.signature, "c2lnbmF0dXJl");
    assert_eq!(result.digest.as_deref(), Some("SLUSH1"));
}

#[tokio::test]
async fn test_slush_without_execute_returns_signed_only() {
    let signer = MockSigner::new();
    let wallet = WalletHandle::new("Slush")
        .with_account(SUBSCRIBER)
        .with_feature_sign(signer.clone());

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert!(result.is_missing_digest());
    assert!(!result.success);
    let signed = result.signed.expect("signed payload");
    assert_eq!(signed.bytes, "AAECAw==");
}

// =============================================================================
// Sign Only
// =============================================================================

#[tokio::test]
async fn test_sign_only_wallet_returns_signature_without_digest() {
    let signer = MockSigner::new();
    let wallet = WalletHandle::new("Signer")
        .with_account(SUBSCRIBER)
        .with_sign(signer.clone());

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert_eq!(signer.call_count(), 1);
    assert!(result.digest.is_none());
    assert!(result.signed.is_some());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_missing_wallet_and_account() {
    let err = executor()
        .execute(None, request(), ResultOptions::effects())
        .await
        .unwrap_err();
    assert_eq!(err, WalletError::NotConnected);

    let no_account = WalletHandle::new("Empty").with_sign_and_execute(MockSignAndExecute::ok(json!({})));
    let err = executor()
        .execute(Some(&no_account), request(), ResultOptions::effects())
        .await
        .unwrap_err();
    assert_eq!(err, WalletError::NoAccount);
}

#[tokio::test]
async fn test_unsupported_wallet_lists_available_methods() {
    let wallet = bare_wallet(SUBSCRIBER);

    let err = assert_err(
        executor().execute(Some(&wallet), request(), ResultOptions::effects()).await,
        "bare wallet dispatch",
    );

    match &err {
        WalletError::UnsupportedWallet { wallet, available_methods } => {
            assert_eq!(wallet, "Bare Wallet");
            assert!(available_methods.iter().any(|m| m.contains("standard:connect")));
        }
        other => panic!("expected UnsupportedWallet, got {:?}", other),
    }
    assert!(!err.is_retryable());
    assert_error_contains(&err, "standard:connect", "unsupported wallet message");
}

#[tokio::test]
async fn test_user_rejection_is_categorized() {
    let imp = MockSignAndExecute::failing(WalletCallError::new("User rejected the request").with_code(4001));
    let wallet = WalletHandle::new("Suiet")
        .with_account(SUBSCRIBER)
        .with_sign_and_execute(imp);

    let err = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap_err();

    assert_eq!(err.category(), Some(FailureCategory::UserRejected));
    match err {
        WalletError::SigningFailed(failure) => {
            assert_eq!(failure.vendor, "Suiet");
            assert_eq!(failure.code, Some(4001));
        }
        other => panic!("expected SigningFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gas_failure_without_code_uses_message() {
    let imp = MockSignAndExecute::failing(WalletCallError::new("InsufficientGas: balance too low"));
    let wallet = WalletHandle::new("Suiet")
        .with_account(SUBSCRIBER)
        .with_sign_and_execute(imp);

    let err = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap_err();
    assert_eq!(err.category(), Some(FailureCategory::InsufficientGas));
}

// =============================================================================
// Response Normalization
// =============================================================================

#[tokio::test]
async fn test_reported_digest_survives_normalization() {
    let (wallet, _) = standard_wallet("Suiet", SUBSCRIBER, json!({ "digest": "0xDEAD" }));

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert_eq!(result.digest.as_deref(), Some("0xDEAD"));
    assert!(result.success);
}

#[tokio::test]
async fn test_response_without_digest_is_not_success() {
    let (wallet, _) = standard_wallet("Suiet", SUBSCRIBER, json!({ "effects": {} }));

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert!(result.is_missing_digest());
    assert!(!result.success);
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_failed_effects_carry_error() {
    let (wallet, _) = standard_wallet("Suiet", SUBSCRIBER, json!({
        "digest": "FAILED1",
        "effects": { "status": { "status": "failure", "error": "MoveAbort(..., 3)" } }
    }));

    let result = executor()
        .execute(Some(&wallet), request(), ResultOptions::effects())
        .await
        .unwrap();

    assert_eq!(result.digest.as_deref(), Some("FAILED1"));
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("MoveAbort(..., 3)"));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_describe_wallet_reports_path() {
    let (wallet, _, _) = slush_wallet(SUBSCRIBER, json!({}));
    let report = describe_wallet(Some(&wallet));
    assert!(report.contains("Slush"));
    assert!(report.contains("sui:signTransactionBlock"));

    let none = describe_wallet(None);
    assert!(!none.is_empty());
}
