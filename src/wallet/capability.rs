//! Wallet capability probing and dispatch path selection.
//!
//! [`probe`] is a pure function of the wallet's current shape. The resulting
//! [`CapabilityReport`] decides which [`DispatchPath`] a transaction takes
//! through a fixed priority table; the first entry that matches wins.

use serde::Serialize;

use super::handle::WalletHandle;

/// Vendor-specific behaviour that changes how a wallet must be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorQuirk {
    /// The wallet needs the chain identifier on every signing call.
    ExplicitChainId,
}

#[derive(Debug, Clone, Copy)]
pub struct KnownVendor {
    /// Matched case-insensitively against the wallet's display name.
    pub name_fragment: &'static str,
    pub quirk: VendorQuirk,
}

pub const KNOWN_VENDORS: &[KnownVendor] = &[KnownVendor {
    name_fragment: "slush",
    quirk: VendorQuirk::ExplicitChainId,
}];

/// Look up a vendor quirk by wallet display name.
pub fn vendor_quirk(name: &str) -> Option<VendorQuirk> {
    let lower = name.to_lowercase();
    KNOWN_VENDORS
        .iter()
        .find(|v| lower.contains(v.name_fragment))
        .map(|v| v.quirk)
}

/// Signing mechanisms a wallet exposes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityReport {
    /// Set when no wallet was supplied; every other flag is false.
    pub no_wallet: bool,
    pub standard_sign_and_execute: bool,
    pub feature_sign: bool,
    pub feature_execute: bool,
    pub adapter_sign_and_execute: bool,
    pub generic_sign: bool,
    pub vendor_quirk: Option<VendorQuirk>,
}

/// Route a transaction takes through the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPath {
    /// Feature-flag sign with an explicit chain id, then feature-flag execute
    /// when available.
    VendorQuirk(VendorQuirk),
    Standard,
    Adapter,
    /// Signature only; the caller submits.
    SignOnly,
}

impl DispatchPath {
    pub fn short_name(&self) -> &'static str {
        match self {
            DispatchPath::VendorQuirk(_) => "vendor_quirk",
            DispatchPath::Standard => "standard",
            DispatchPath::Adapter => "adapter",
            DispatchPath::SignOnly => "sign_only",
        }
    }
}

type PathRule = fn(&CapabilityReport) -> Option<DispatchPath>;

fn quirk_rule(r: &CapabilityReport) -> Option<DispatchPath> {
    match r.vendor_quirk {
        Some(quirk) if r.feature_sign => Some(DispatchPath::VendorQuirk(quirk)),
        _ => None,
    }
}

fn standard_rule(r: &CapabilityReport) -> Option<DispatchPath> {
    r.standard_sign_and_execute.then_some(DispatchPath::Standard)
}

fn adapter_rule(r: &CapabilityReport) -> Option<DispatchPath> {
    r.adapter_sign_and_execute.then_some(DispatchPath::Adapter)
}

fn sign_only_rule(r: &CapabilityReport) -> Option<DispatchPath> {
    (r.generic_sign || r.feature_sign).then_some(DispatchPath::SignOnly)
}

/// Dispatch priority, highest first.
const DISPATCH_PRIORITY: [PathRule; 4] = [quirk_rule, standard_rule, adapter_rule, sign_only_rule];

impl CapabilityReport {
    /// The path a transaction would take, or `None` when the wallet cannot
    /// sign at all.
    pub fn dispatch_path(&self) -> Option<DispatchPath> {
        DISPATCH_PRIORITY.iter().find_map(|rule| rule(self))
    }

    pub fn has_signing_capability(&self) -> bool {
        self.dispatch_path().is_some()
    }

    pub fn is_known_vendor_quirk(&self) -> bool {
        self.vendor_quirk.is_some()
    }
}

/// Report which signing mechanisms `wallet` exposes.
pub fn probe(wallet: Option<&WalletHandle>) -> CapabilityReport {
    let Some(wallet) = wallet else {
        return CapabilityReport {
            no_wallet: true,
            ..CapabilityReport::default()
        };
    };

    CapabilityReport {
        no_wallet: false,
        standard_sign_and_execute: wallet.sign_and_execute.is_some(),
        feature_sign: wallet.feature_sign().is_some(),
        feature_execute: wallet.feature_execute().is_some(),
        adapter_sign_and_execute: wallet.adapter.is_some(),
        generic_sign: wallet.sign.is_some(),
        vendor_quirk: vendor_quirk(&wallet.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::handle::WalletFeature;

    fn report() -> CapabilityReport {
        CapabilityReport::default()
    }

    #[test]
    fn test_absent_wallet() {
        let r = probe(None);
        assert!(r.no_wallet);
        assert!(!r.has_signing_capability());
        assert_eq!(r.vendor_quirk, None);
    }

    #[test]
    fn test_vendor_match_is_case_insensitive() {
        assert_eq!(vendor_quirk("SLUSH Wallet"), Some(VendorQuirk::ExplicitChainId));
        assert_eq!(vendor_quirk("Suiet"), None);
    }

    #[test]
    fn test_bare_wallet_has_no_capability() {
        let wallet = WalletHandle::new("Plain")
            .with_account("0xaaa")
            .with_feature("standard:connect", WalletFeature::Other);
        let r = probe(Some(&wallet));
        assert!(!r.no_wallet);
        assert!(!r.has_signing_capability());
    }

    #[test]
    fn test_priority_order() {
        let all = CapabilityReport {
            standard_sign_and_execute: true,
            feature_sign: true,
            feature_execute: true,
            adapter_sign_and_execute: true,
            generic_sign: true,
            vendor_quirk: Some(VendorQuirk::ExplicitChainId),
            ..report()
        };
        assert_eq!(
            all.dispatch_path(),
            Some(DispatchPath::VendorQuirk(VendorQuirk::ExplicitChainId))
        );

        let no_quirk = CapabilityReport {
            vendor_quirk: None,
            ..all.clone()
        };
        assert_eq!(no_quirk.dispatch_path(), Some(DispatchPath::Standard));

        let adapter_and_sign = CapabilityReport {
            adapter_sign_and_execute: true,
            generic_sign: true,
            ..report()
        };
        assert_eq!(adapter_and_sign.dispatch_path(), Some(DispatchPath::Adapter));

        let sign = CapabilityReport {
            generic_sign: true,
            ..report()
        };
        assert_eq!(sign.dispatch_path(), Some(DispatchPath::SignOnly));
    }

    #[test]
    fn test_quirk_without_feature_sign_uses_standard() {
        let r = CapabilityReport {
            standard_sign_and_execute: true,
            vendor_quirk: Some(VendorQuirk::ExplicitChainId),
            ..report()
        };
        assert_eq!(r.dispatch_path(), Some(DispatchPath::Standard));
    }
}
