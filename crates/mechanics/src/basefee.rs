//! The EIP-1559 base-fee adjustment rule.

use core::cmp::Ordering;

/// Bounds a single-step base-fee change to 1/8 (12.5%) of the current fee.
pub const BASE_FEE_MAX_CHANGE_DENOMINATOR: u64 = 8;

/// The gas target is the gas limit divided by this multiplier.
pub const ELASTICITY_MULTIPLIER: u64 = 2;

/// The direction of an observed base-fee transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeeDirection {
    /// The base fee rose.
    #[display("increase")]
    Increase,
    /// The base fee fell.
    #[display("decrease")]
    Decrease,
    /// The base fee did not move.
    #[display("unchanged")]
    Unchanged,
}

/// Computes the next block's base fee from the current block's base fee and
/// gas usage, per the EIP-1559 update rule.
///
/// - At target, the fee is unchanged.
/// - Above target, the fee rises proportionally to the excess, by at least
///   1 wei and by at most 12.5%.
/// - Below target, the fee falls symmetrically, by at most 12.5%, never
///   going below zero.
///
/// A zero gas target leaves the fee unchanged; such records never reach this
/// function through the derivation pass, which rejects them as malformed.
pub fn next_base_fee(current_base_fee: u64, gas_used: u64, gas_target: u64) -> u64 {
    if gas_target == 0 {
        return current_base_fee;
    }
    let fee = current_base_fee as u128;
    let target = gas_target as u128;
    let denominator = BASE_FEE_MAX_CHANGE_DENOMINATOR as u128;
    // The proportional formula caps itself at fee/8 whenever gas_used stays
    // within the gas limit; the explicit cap covers out-of-range inputs.
    let cap = fee / denominator;
    match gas_used.cmp(&gas_target) {
        Ordering::Equal => current_base_fee,
        Ordering::Greater => {
            let excess = (gas_used - gas_target) as u128;
            let delta = (fee.saturating_mul(excess) / target / denominator).min(cap).max(1);
            current_base_fee.saturating_add(delta as u64)
        }
        Ordering::Less => {
            let shortfall = (gas_target - gas_used) as u128;
            let delta = (fee.saturating_mul(shortfall) / target / denominator).min(cap);
            current_base_fee - delta as u64
        }
    }
}

/// Classifies a base-fee percentage change, with exact zero as the boundary.
///
/// Total over all float inputs; a NaN delta classifies as unchanged.
pub fn classify_direction(delta_pct: f64) -> FeeDirection {
    if delta_pct > 0.0 {
        FeeDirection::Increase
    } else if delta_pct < 0.0 {
        FeeDirection::Decrease
    } else {
        FeeDirection::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const GWEI: u64 = 1_000_000_000;
    const TARGET: u64 = 15_000_000;

    #[test]
    fn test_at_target_leaves_fee_unchanged() {
        assert_eq!(next_base_fee(GWEI, TARGET, TARGET), GWEI);
        assert_eq!(next_base_fee(0, TARGET, TARGET), 0);
    }

    #[test]
    fn test_full_block_raises_exactly_one_eighth() {
        // gas_used at the limit (2x target) hits the 12.5% ceiling exactly.
        assert_eq!(next_base_fee(GWEI, 2 * TARGET, TARGET), 1_125_000_000);
    }

    #[test]
    fn test_empty_block_lowers_exactly_one_eighth() {
        assert_eq!(next_base_fee(GWEI, 0, TARGET), 875_000_000);
    }

    #[test]
    fn test_tiny_fee_still_rises_by_one_wei() {
        // The proportional delta rounds to zero but the protocol guarantees
        // at least a 1-wei increase.
        assert_eq!(next_base_fee(7, TARGET + 1, TARGET), 8);
        assert_eq!(next_base_fee(0, 2 * TARGET, TARGET), 1);
    }

    #[test]
    fn test_zero_fee_floor_on_decrease() {
        assert_eq!(next_base_fee(0, 0, TARGET), 0);
        assert_eq!(next_base_fee(1, 0, TARGET), 1); // 1/8 rounds to zero
        assert_eq!(next_base_fee(8, 0, TARGET), 7);
    }

    #[test]
    fn test_over_limit_usage_is_still_capped() {
        // gas_used beyond 2x target must not push the step above 12.5%.
        assert_eq!(next_base_fee(GWEI, 10 * TARGET, TARGET), 1_125_000_000);
    }

    #[test]
    fn test_zero_target_is_a_no_op() {
        assert_eq!(next_base_fee(GWEI, 1_000, 0), GWEI);
    }

    #[test]
    fn test_classify_direction_partitions() {
        assert_eq!(classify_direction(0.0001), FeeDirection::Increase);
        assert_eq!(classify_direction(-0.0001), FeeDirection::Decrease);
        assert_eq!(classify_direction(0.0), FeeDirection::Unchanged);
        assert_eq!(classify_direction(-0.0), FeeDirection::Unchanged);
        assert_eq!(classify_direction(f64::NAN), FeeDirection::Unchanged);
    }

    proptest! {
        #[test]
        fn prop_above_target_rises_within_bound(
            fee in 0u64..=u64::MAX / 2,
            target in 1u64..=60_000_000,
            excess in 1u64..=60_000_000,
        ) {
            let gas_used = target.saturating_add(excess);
            let next = next_base_fee(fee, gas_used, target);
            prop_assert!(next > fee);
            // Relative increase stays within 12.5%, up to 1 wei of rounding.
            prop_assert!(next - fee <= fee / 8 + 1);
        }

        #[test]
        fn prop_below_target_falls_within_bound(
            fee in 0u64..=u64::MAX / 2,
            target in 1u64..=60_000_000,
            gas_used in 0u64..=60_000_000,
        ) {
            prop_assume!(gas_used < target);
            let next = next_base_fee(fee, gas_used, target);
            prop_assert!(next <= fee);
            prop_assert!(fee - next <= fee / 8);
        }

        #[test]
        fn prop_classify_is_total(delta in proptest::num::f64::ANY) {
            // Any float lands in exactly one variant without panicking.
            let _ = classify_direction(delta);
        }
    }
}
