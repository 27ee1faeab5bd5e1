//! sui-subscriptions: inspect recurring-payment subscriptions on Sui
//!
//! ## Example Usage
//!
//! ```bash
//! # Subscriptions owned by an address
//! sui-subscriptions list 0xA11CE...
//!
//! # Subscriptions paying a merchant
//! sui-subscriptions merchant 0xMERCHANT... --subscriber 0xA11CE...
//!
//! # Inspect a transaction and the local history
//! sui-subscriptions tx 0xDIGEST...
//! sui-subscriptions history list
//!
//! # Effective configuration
//! sui-subscriptions config --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use sui_subscriptions::logging::init_logging;
use sui_subscriptions::AppConfig;
use sui_subscriptions_transport::Network;

mod subscriptions_cli;

use subscriptions_cli::{
    history::{CreatedCmd, HistoryCmd},
    output::{print_config, print_intervals},
    query::{BalanceCmd, ListCmd, MerchantCmd, ShowCmd, TxCmd},
    CliContext,
};

#[derive(Parser)]
#[command(
    name = "sui-subscriptions",
    author,
    version,
    about = "Inspect Sui recurring-payment subscriptions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Network to query (mainnet, testnet, devnet, localnet)
    #[arg(long, global = true)]
    network: Option<Network>,

    /// Fullnode JSON-RPC URL (default: the network's public fullnode)
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Local storage file for history and connection state
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging for this tool's crates
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List subscriptions owned by an address
    List(ListCmd),

    /// List subscriptions paying a merchant
    Merchant(MerchantCmd),

    /// Show one subscription
    Show(ShowCmd),

    /// Inspect a transaction
    Tx(TxCmd),

    /// Locally recorded transactions
    History(HistoryCmd),

    /// Locally recorded created subscriptions
    Created(CreatedCmd),

    /// SUI balance of an address
    Balance(BalanceCmd),

    /// Supported billing intervals
    Intervals,

    /// Effective configuration (network, package, registry, storage)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        network,
        rpc_url,
        storage,
        json,
        verbose,
    } = Cli::parse();
    init_logging(verbose);

    let config = AppConfig::from_env()?.with_overrides(network, rpc_url.as_deref(), storage);
    let ctx = CliContext::new(config, json)?;

    match command {
        Commands::List(cmd) => cmd.execute(&ctx).await,
        Commands::Merchant(cmd) => cmd.execute(&ctx).await,
        Commands::Show(cmd) => cmd.execute(&ctx).await,
        Commands::Tx(cmd) => cmd.execute(&ctx).await,
        Commands::History(cmd) => cmd.execute(&ctx),
        Commands::Created(cmd) => cmd.execute(&ctx),
        Commands::Balance(cmd) => cmd.execute(&ctx).await,
        Commands::Intervals => print_intervals(json),
        Commands::Config => print_config(&ctx.config, json),
    }
}
