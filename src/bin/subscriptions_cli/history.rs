//! Local transaction history.

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{print_created, print_json, print_transactions};
use super::CliContext;

#[derive(Parser, Debug)]
pub struct HistoryCmd {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// List recorded transaction digests
    List,
    /// Record a digest by hand (must start with 0x)
    Add { digest: String },
    /// Forget all recorded digests
    Clear,
}

impl HistoryCmd {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        let history = ctx.history();
        match &self.action {
            HistoryAction::List => print_transactions(&history.transactions(), ctx.json),
            HistoryAction::Add { digest } => {
                history.add_transaction(digest)?;
                if ctx.json {
                    return print_json(&serde_json::json!({ "success": true, "digest": digest.trim() }));
                }
                println!("Recorded {}", digest.trim());
                Ok(())
            }
            HistoryAction::Clear => {
                history.clear_transactions();
                if ctx.json {
                    return print_json(&serde_json::json!({ "success": true }));
                }
                println!("History cleared");
                Ok(())
            }
        }
    }
}

#[derive(Parser, Debug)]
pub struct CreatedCmd {
    /// Forget recorded subscriptions instead of listing them
    #[arg(long)]
    pub clear: bool,
}

impl CreatedCmd {
    pub fn execute(&self, ctx: &CliContext) -> Result<()> {
        if self.clear {
            ctx.history().clear_created();
            println!("Created subscriptions cleared");
            return Ok(());
        }
        print_created(&ctx.history().created_subscriptions(), ctx.json)
    }
}
