//! Human-readable wallet capability report, for support and debugging.

use std::fmt::Write;

use super::capability::{probe, VendorQuirk};
use super::handle::{
    WalletHandle, FEATURE_EXECUTE_TRANSACTION, FEATURE_SIGN_TRANSACTION, METHOD_ADAPTER_SIGN_AND_EXECUTE,
    METHOD_SIGN, METHOD_SIGN_AND_EXECUTE,
};

pub fn describe_wallet(wallet: Option<&WalletHandle>) -> String {
    let Some(wallet) = wallet else {
        return "No wallet connected\n".to_string();
    };
    let report = probe(Some(wallet));
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "Wallet: {}", display_name(&wallet.name));
    let _ = writeln!(out, "Accounts: {}", wallet.accounts.len());
    for account in &wallet.accounts {
        let _ = writeln!(out, "- {}", account.address);
    }

    let _ = writeln!(out, "\n=== Basic Features ===");
    let _ = writeln!(out, "Connected: {}", !wallet.accounts.is_empty());
    let _ = writeln!(out, "Chain: {}", wallet.chain.as_deref().unwrap_or("unknown"));

    let _ = writeln!(out, "\n=== Transaction Signing ===");
    let _ = writeln!(out, "{}: {}", METHOD_SIGN_AND_EXECUTE, report.standard_sign_and_execute);
    let _ = writeln!(out, "{}: {}", METHOD_ADAPTER_SIGN_AND_EXECUTE, report.adapter_sign_and_execute);
    let _ = writeln!(out, "{}: {}", METHOD_SIGN, report.generic_sign);
    let _ = writeln!(
        out,
        "Dispatch path: {}",
        report
            .dispatch_path()
            .map(|p| p.short_name())
            .unwrap_or("none (unsupported)")
    );

    let _ = writeln!(out, "\n=== Wallet Features ===");
    if wallet.features.is_empty() {
        let _ = writeln!(out, "No features advertised");
    } else {
        let _ = writeln!(out, "Feature count: {}", wallet.features.len());
        for name in wallet.features.keys() {
            let _ = writeln!(out, "- {}", name);
            if name.to_lowercase().contains("sign") {
                let _ = writeln!(out, "  (signing feature)");
            }
        }
    }
    let _ = writeln!(out, "\nSui-specific features:");
    let _ = writeln!(out, "- {}: {}", FEATURE_SIGN_TRANSACTION, report.feature_sign);
    let _ = writeln!(out, "- {}: {}", FEATURE_EXECUTE_TRANSACTION, report.feature_execute);

    if !wallet.network_switch.is_empty() {
        let names: Vec<&str> = wallet.network_switch.iter().map(|(n, _)| n.as_str()).collect();
        let _ = writeln!(out, "\nNetwork switch methods: {}", names.join(", "));
    }

    if let Some(quirk) = report.vendor_quirk {
        let _ = writeln!(out, "\n=== Vendor Specific ===");
        match quirk {
            VendorQuirk::ExplicitChainId => {
                let _ = writeln!(out, "Requires explicit chain id on signing calls");
            }
        }
        let _ = writeln!(out, "Has adapter: {}", wallet.adapter.is_some());
    }

    out
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "Unknown"
    } else {
        name
    }
}
