//! Chain queries: subscriptions, transactions, balances.

use anyhow::{anyhow, Result};
use clap::Parser;

use sui_subscriptions::inspect::inspect_transaction;
use sui_subscriptions::read_model::{format_minor_units, SUI_DECIMALS};

use super::output::{format_record, format_summary, print_json, print_records};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct ListCmd {
    /// Subscriber address
    pub owner: String,
}

impl ListCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let records = ctx.service.subscriptions_for(&self.owner).await?;
        print_records(&records, ctx.json)
    }
}

#[derive(Parser, Debug)]
pub struct MerchantCmd {
    /// Merchant address
    pub address: String,

    /// Subscriber addresses to scan (repeatable)
    #[arg(long = "subscriber")]
    pub subscribers: Vec<String>,
}

impl MerchantCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let records = ctx
            .service
            .merchant_subscriptions(&self.address, &self.subscribers)
            .await?;
        print_records(&records, ctx.json)
    }
}

#[derive(Parser, Debug)]
pub struct ShowCmd {
    /// Subscription object id
    pub id: String,
}

impl ShowCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let record = ctx
            .service
            .subscription(&self.id)
            .await?
            .ok_or_else(|| anyhow!("Subscription {} not found", self.id))?;
        if ctx.json {
            return print_json(&record);
        }
        println!("{}", format_record(&record));
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct TxCmd {
    /// Transaction digest
    pub digest: String,
}

impl TxCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let client = ctx.service.client();
        let summary = inspect_transaction(client.as_ref(), &self.digest)
            .await?
            .ok_or_else(|| anyhow!("Transaction {} not found on {}", self.digest, ctx.config.network.name()))?;
        if ctx.json {
            return print_json(&summary);
        }
        print!("{}", format_summary(&summary));
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct BalanceCmd {
    /// Address to query
    pub owner: String,
}

impl BalanceCmd {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let balance = ctx.service.balance(&self.owner).await?;
        if ctx.json {
            return print_json(&serde_json::json!({
                "owner": self.owner,
                "coinType": balance.coin_type,
                "totalBalance": balance.total_balance.to_string(),
                "coinObjectCount": balance.coin_object_count,
            }));
        }
        let whole = u64::try_from(balance.total_balance)
            .map(|mist| format_minor_units(mist, SUI_DECIMALS))
            .unwrap_or_else(|_| format!("{} MIST", balance.total_balance));
        println!("{} SUI across {} coins", whole, balance.coin_object_count);
        Ok(())
    }
}
