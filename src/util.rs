// Display helpers shared by the sidebar, batch list and status line.

use alloy_primitives::utils::{format_ether, parse_ether};
use alloy_primitives::{Address, U256};

/// `0x1234…abcd`, or an em placeholder for the zero address.
pub fn short_address(addr: &Address) -> String {
    if *addr == Address::ZERO {
        return "—".to_string();
    }
    let full = addr.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_wei(wei: U256) -> String {
    let raw = format_ether(wei);
    let trimmed = if raw.contains('.') {
        raw.trim_end_matches('0').trim_end_matches('.')
    } else {
        raw.as_str()
    };
    format!("{} ETH", trimmed)
}

/// Parses the list-price field. Empty input means zero.
pub fn parse_price(input: &str) -> Option<U256> {
    let value = input.trim();
    let value = if value.is_empty() { "0" } else { value };
    parse_ether(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_keeps_prefix_and_suffix() {
        let addr = Address::repeat_byte(0xab);
        let short = short_address(&addr);
        assert!(short.starts_with("0x"));
        assert_eq!(short.chars().count(), 6 + 1 + 4);
        assert_eq!(short_address(&Address::ZERO), "—");
    }

    #[test]
    fn wei_is_shown_in_ether_without_trailing_zeros() {
        assert_eq!(format_wei(U256::from(10u64).pow(U256::from(18u64))), "1 ETH");
        assert_eq!(format_wei(U256::from(250_000_000_000_000_000u64)), "0.25 ETH");
        assert_eq!(format_wei(U256::ZERO), "0 ETH");
    }

    #[test]
    fn price_field_parsing() {
        assert_eq!(parse_price(""), Some(U256::ZERO));
        assert_eq!(
            parse_price(" 0.5 "),
            Some(U256::from(500_000_000_000_000_000u64))
        );
        assert_eq!(parse_price("abc"), None);
    }
}
