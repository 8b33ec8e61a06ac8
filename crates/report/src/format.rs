//! Wei display conversions.
//!
//! The engine works in integer wei end to end; the 1e9/1e18 divisors live
//! here, at the presentation boundary.

/// Wei per gwei.
const WEI_PER_GWEI: f64 = 1e9;

/// Wei per ETH.
const WEI_PER_ETH: f64 = 1e18;

/// Converts wei to gwei.
pub const fn gwei(wei: f64) -> f64 {
    wei / WEI_PER_GWEI
}

/// Converts wei to ETH.
pub const fn eth(wei: f64) -> f64 {
    wei / WEI_PER_ETH
}

/// Converts a signed wei amount to ETH.
pub const fn eth_signed(wei: i128) -> f64 {
    wei as f64 / WEI_PER_ETH
}

/// Formats a wei amount as gwei with four decimals.
pub fn fmt_gwei(wei: f64) -> String {
    format!("{:.4}", gwei(wei))
}

/// Formats a wei amount as ETH with six decimals.
pub fn fmt_eth(wei: f64) -> String {
    format!("{:.6}", eth(wei))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gwei_conversion() {
        assert_eq!(gwei(1_000_000_000.0), 1.0);
        assert_eq!(fmt_gwei(12_345_678_900.0), "12.3457");
    }

    #[test]
    fn test_eth_conversion() {
        assert_eq!(eth(1e18), 1.0);
        assert_eq!(fmt_eth(1_500_000_000_000_000.0), "0.001500");
    }

    #[test]
    fn test_signed_eth_keeps_sign() {
        assert_eq!(eth_signed(-2_000_000_000_000_000_000), -2.0);
        assert_eq!(eth_signed(2_000_000_000_000_000_000), 2.0);
    }
}
