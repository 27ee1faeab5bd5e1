//! Output formatting for sui-subscriptions CLI

use anyhow::Result;
use serde::Serialize;

use sui_subscriptions::contract::INTERVAL_NAMES;
use sui_subscriptions::AppConfig;
use sui_subscriptions::inspect::TransactionSummary;
use sui_subscriptions::read_model::SubscriptionRecord;
use sui_subscriptions::storage::{CreatedSubscription, TransactionRecord};
use sui_subscriptions_types::short_address;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_record(record: &SubscriptionRecord) -> String {
    format!(
        "\x1b[1m{}\x1b[0m  {}  every {} ({})  next {}  paid {}x  merchant {}",
        short_address(&record.id),
        record.display_amount(),
        record.interval,
        record.status,
        record.next_payment,
        record.payments_made,
        short_address(&record.merchant),
    )
}

pub fn print_records(records: &[SubscriptionRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No subscriptions found");
        return Ok(());
    }
    for record in records {
        println!("{}", format_record(record));
    }
    Ok(())
}

pub fn format_summary(summary: &TransactionSummary) -> String {
    let mut out = String::new();
    if summary.succeeded() {
        out.push_str(&format!("\x1b[32m✓ {} succeeded\x1b[0m\n", summary.digest));
    } else {
        out.push_str(&format!(
            "\x1b[31m✗ {} {}: {}\x1b[0m\n",
            summary.digest,
            summary.status,
            summary.error.as_deref().unwrap_or("no error reported")
        ));
    }
    if let Some(sender) = &summary.sender {
        out.push_str(&format!("Sender: {}\n", sender));
    }
    if let Some(gas) = summary.gas_used {
        out.push_str(&format!("Gas used: {} MIST\n", gas));
    }
    for (title, objects) in [("Created", &summary.created), ("Mutated", &summary.mutated)] {
        if objects.is_empty() {
            continue;
        }
        out.push_str(&format!("\x1b[1m{} Objects:\x1b[0m\n", title));
        for obj in objects {
            out.push_str(&format!(
                "  {} {}\n",
                obj.object_id,
                obj.object_type.as_deref().unwrap_or("")
            ));
        }
    }
    if !summary.events.is_empty() {
        out.push_str("\x1b[1mEvents:\x1b[0m\n");
        for event in &summary.events {
            out.push_str(&format!("  {}\n", event.event_type));
            if let Some(json) = &event.parsed_json {
                out.push_str(&format!("    {}\n", json));
            }
        }
    }
    out
}

pub fn print_transactions(records: &[TransactionRecord], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No recorded transactions");
    }
    for record in records {
        println!("{}  {}", record.timestamp.format("%Y-%m-%d %H:%M:%S"), record.digest);
    }
    Ok(())
}

pub fn print_created(records: &[CreatedSubscription], json: bool) -> Result<()> {
    if json {
        return print_json(records);
    }
    if records.is_empty() {
        println!("No recorded subscriptions");
    }
    for record in records {
        println!(
            "{}  {}  {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.id,
            record.digest.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn print_intervals(json: bool) -> Result<()> {
    if json {
        let map: serde_json::Map<String, serde_json::Value> = INTERVAL_NAMES
            .iter()
            .map(|(name, secs)| (name.to_string(), serde_json::json!(secs)))
            .collect();
        return print_json(&map);
    }
    for (name, secs) in INTERVAL_NAMES {
        println!("{:<10} {:>9} s", name, secs);
    }
    Ok(())
}

pub fn print_config(config: &AppConfig, json: bool) -> Result<()> {
    let delays: Vec<u128> = config.confirmation.delays.iter().map(|d| d.as_millis()).collect();
    if json {
        return print_json(&serde_json::json!({
            "network": config.network.name(),
            "chainId": config.network.chain_id,
            "rpcUrl": config.network.rpc_url,
            "packageId": config.package_id,
            "registryId": config.registry_id,
            "storagePath": config.storage_path.display().to_string(),
            "reloadDebounceMs": config.reload_debounce.as_millis(),
            "confirmationDelaysMs": delays,
        }));
    }
    println!("Network:       {} ({})", config.network.name(), config.network.chain_id);
    println!("RPC URL:       {}", config.network.rpc_url);
    println!("Package:       {}", config.package_id);
    println!("Registry:      {}", config.registry_id);
    println!("Storage:       {}", config.storage_path.display());
    println!("Reload window: {} ms", config.reload_debounce.as_millis());
    println!("Confirmation:  {:?} ms", delays);
    Ok(())
}
