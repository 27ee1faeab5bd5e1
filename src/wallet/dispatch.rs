//! Transaction execution dispatcher.
//!
//! Takes an unsigned [`TransactionRequest`], picks the one path the wallet
//! supports (see [`DispatchPath`]) and normalizes whatever the wallet returns
//! into a [`TransactionResult`]. The dispatcher never touches connection
//! state or storage, and performs no unit conversion.

use tracing::{debug, info, warn};

use sui_subscriptions_transport::NetworkInfo;
use sui_subscriptions_types::{ResultOptions, SignedTransaction, TransactionRequest, TransactionResult};

use super::capability::{probe, DispatchPath};
use super::error::{SigningFailure, WalletError};
use super::handle::{
    ExecuteInput, ExecuteRequestType, SignAndExecuteInput, SignInput, WalletAccount,
    WalletCallError, WalletHandle,
};

#[derive(Debug, Clone, Default)]
pub struct TransactionExecutor {
    network: NetworkInfo,
}

impl TransactionExecutor {
    pub fn new(network: NetworkInfo) -> Self {
        Self { network }
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    /// Check preconditions and choose the dispatch path, without calling
    /// the wallet.
    pub fn select_path(&self, wallet: Option<&WalletHandle>) -> Result<DispatchPath, WalletError> {
        let wallet = wallet.ok_or(WalletError::NotConnected)?;
        if wallet.accounts.is_empty() {
            return Err(WalletError::NoAccount);
        }
        probe(Some(wallet))
            .dispatch_path()
            .ok_or_else(|| WalletError::UnsupportedWallet {
                wallet: wallet.name.clone(),
                available_methods: wallet.method_names(),
            })
    }

    /// Sign (and, where the wallet can, submit) `request`.
    pub async fn execute(
        &self,
        wallet: Option<&WalletHandle>,
        request: TransactionRequest,
        options: ResultOptions,
    ) -> Result<TransactionResult, WalletError> {
        let path = self.select_path(wallet)?;
        let wallet = wallet.ok_or(WalletError::NotConnected)?;
        let account = wallet
            .primary_account()
            .cloned()
            .ok_or(WalletError::NoAccount)?;

        info!(
            wallet = %wallet.name,
            path = path.short_name(),
            target = %request.target(),
            "dispatching transaction"
        );

        let fail = |err: WalletCallError| {
            warn!(wallet = %wallet.name, error = %err, "wallet call failed");
            WalletError::SigningFailed(SigningFailure::from_call_error(&wallet.name, err))
        };

        let result = match path {
            DispatchPath::VendorQuirk(_) => {
                self.execute_with_chain_id(wallet, request, account, options)
                    .await
                    .map_err(fail)?
            }
            DispatchPath::Standard => {
                let imp = wallet.sign_and_execute.as_ref().ok_or_else(|| unsupported(wallet))?;
                let input = SignAndExecuteInput {
                    request,
                    account,
                    // Quirky wallets that lack the feature-flag sign still
                    // need the chain spelled out.
                    chain: probe(Some(wallet))
                        .vendor_quirk
                        .map(|_| self.network.chain_id.clone()),
                    options,
                };
                TransactionResult::from_response(imp.sign_and_execute(input).await.map_err(fail)?)
            }
            DispatchPath::Adapter => {
                let imp = wallet.adapter.as_ref().ok_or_else(|| unsupported(wallet))?;
                let input = SignAndExecuteInput {
                    request,
                    account,
                    chain: None,
                    options,
                };
                TransactionResult::from_response(imp.sign_and_execute(input).await.map_err(fail)?)
            }
            DispatchPath::SignOnly => {
                let imp = wallet
                    .sign
                    .as_ref()
                    .or_else(|| wallet.feature_sign())
                    .ok_or_else(|| unsupported(wallet))?;
                let raw = imp
                    .sign_transaction(SignInput {
                        request,
                        account,
                        chain: None,
                    })
                    .await
                    .map_err(fail)?;
                let signed = SignedTransaction::from_value(&raw)
                    .ok_or_else(|| fail(WalletCallError::new("wallet returned no signature")))?;
                TransactionResult::signed_only(signed, raw)
            }
        };

        match &result.digest {
            Some(digest) => debug!(digest = %digest, success = result.success, "wallet responded"),
            None if result.signed.is_some() => debug!("transaction signed, not submitted"),
            None => warn!(
                wallet = %wallet.name,
                error = result.error.as_deref().unwrap_or_default(),
                "wallet response has no digest"
            ),
        }
        Ok(result)
    }

    /// Feature-flag sign with the expected chain id, then feature-flag
    /// execute if the wallet has it.
    async fn execute_with_chain_id(
        &self,
        wallet: &WalletHandle,
        request: TransactionRequest,
        account: WalletAccount,
        options: ResultOptions,
    ) -> Result<TransactionResult, WalletCallError> {
        let signer = wallet
            .feature_sign()
            .ok_or_else(|| WalletCallError::new("sign feature disappeared"))?;
        let public_key = account.public_key.clone();
        let raw = signer
            .sign_transaction(SignInput {
                request,
                account,
                chain: Some(self.network.chain_id.clone()),
            })
            .await?;
        let signed = SignedTransaction::from_value(&raw)
            .ok_or_else(|| WalletCallError::new("wallet returned no signature"))?;

        let Some(executor) = wallet.feature_execute() else {
            return Ok(TransactionResult::signed_only(signed, raw));
        };
        let response = executor
            .execute_transaction(ExecuteInput {
                signed,
                public_key,
                request_type: ExecuteRequestType::WaitForEffectsCert,
                options,
            })
            .await?;
        Ok(TransactionResult::from_response(response))
    }
}

fn unsupported(wallet: &WalletHandle) -> WalletError {
    WalletError::UnsupportedWallet {
        wallet: wallet.name.clone(),
        available_methods: wallet.method_names(),
    }
}
