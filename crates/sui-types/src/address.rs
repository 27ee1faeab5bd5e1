//! Address normalization and validation.
//!
//! Sui addresses and object ids are 32-byte values written as hex, in several
//! forms:
//! - Short form: "0x6"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000006"
//! - Without prefix: "6"
//!
//! Wallets report addresses in full form; users type them in any form. All
//! comparisons in this workspace go through [`normalize_address`].

/// The shared `0x2::clock::Clock` object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

/// Number of hex digits in a full-form address.
const ADDRESS_HEX_LEN: usize = 64;

fn strip_hex_prefix(addr: &str) -> &str {
    addr.strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr)
}

/// Normalize an address to lowercase with 0x prefix and full 64 hex characters.
///
/// # Examples
///
/// ```
/// use sui_subscriptions_types::address::normalize_address;
///
/// assert_eq!(
///     normalize_address("0x6"),
///     "0x0000000000000000000000000000000000000000000000000000000000000006"
/// );
/// ```
pub fn normalize_address(addr: &str) -> String {
    let hex = strip_hex_prefix(addr.trim()).to_lowercase();
    if hex.len() < ADDRESS_HEX_LEN {
        format!("0x{:0>64}", hex)
    } else {
        format!("0x{}", hex)
    }
}

/// Normalize an address, returning None if it is not valid hex of at most
/// 64 digits.
///
/// ```
/// use sui_subscriptions_types::address::normalize_address_checked;
///
/// assert!(normalize_address_checked("0xabc").is_some());
/// assert_eq!(normalize_address_checked("merchant"), None);
/// assert_eq!(normalize_address_checked(""), None);
/// ```
pub fn normalize_address_checked(addr: &str) -> Option<String> {
    let hex = strip_hex_prefix(addr.trim());
    if hex.is_empty() || hex.len() > ADDRESS_HEX_LEN {
        return None;
    }
    // hex::decode needs an even number of digits
    let padded = format!("{:0>64}", hex);
    hex::decode(&padded).ok()?;
    Some(normalize_address(addr))
}

/// Compare two addresses after normalization.
pub fn same_address(a: &str, b: &str) -> bool {
    normalize_address(a) == normalize_address(b)
}

/// Display form `0x1234...abcd`: the first six and last four characters.
///
/// Strings too short to abbreviate are returned unchanged.
pub fn short_address(addr: &str) -> String {
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() <= 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("0xABC"),
            "0x0000000000000000000000000000000000000000000000000000000000000abc"
        );
        assert_eq!(
            normalize_address("  abc "),
            "0x0000000000000000000000000000000000000000000000000000000000000abc"
        );
    }

    #[test]
    fn test_normalize_address_checked_rejects_bad_input() {
        assert_eq!(normalize_address_checked("0xzz"), None);
        assert_eq!(normalize_address_checked("0x"), None);
        let too_long = format!("0x{}", "1".repeat(65));
        assert_eq!(normalize_address_checked(&too_long), None);
        assert_eq!(
            normalize_address_checked("0X1F"),
            Some("0x000000000000000000000000000000000000000000000000000000000000001f".to_string())
        );
    }

    #[test]
    fn test_same_address() {
        assert!(same_address("0x6", CLOCK_OBJECT_ID));
        assert!(same_address(
            "0x0000000000000000000000000000000000000000000000000000000000000006",
            "0x6"
        ));
        assert!(!same_address("0x6", "0x7"));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("0x1234567890abcdef1234567890abcdef"),
            "0x1234...cdef"
        );
        assert_eq!(short_address("0xAAA"), "0xAAA");
    }
}
