//! Per-block metric derivation over an ordered sequence of raw records.

use crate::{
    basefee::{FeeDirection, classify_direction, next_base_fee},
    block::BlockRecord,
    congestion::CongestionBucket,
};

/// The spread of declared priority fees across a block's typed transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriorityFeeSpan {
    /// The smallest declared priority fee, in wei per gas.
    pub min: u128,
    /// The mean declared priority fee, in wei per gas.
    pub avg: u128,
    /// The largest declared priority fee, in wei per gas.
    pub max: u128,
}

/// Metrics derived for a single block. One per accepted raw record,
/// recomputed fresh on every run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockMetrics {
    /// The block number.
    pub number: u64,
    /// The block timestamp, in seconds since the epoch.
    pub timestamp: u64,
    /// The block's base fee per gas, in wei.
    pub base_fee_per_gas: u64,
    /// Total gas consumed by the block.
    pub gas_used: u64,
    /// The block's gas target.
    pub gas_target: u64,
    /// Gas used over gas target: 1.0 at target, 2.0 at the limit.
    pub fullness_ratio: f64,
    /// Percentage change of the base fee vs. the preceding block. `None` for
    /// the first block and across sequence-order violations.
    pub base_fee_delta_pct: Option<f64>,
    /// Direction of the base-fee transition, where the delta is defined.
    pub direction: Option<FeeDirection>,
    /// Wei burned by the block: base fee times gas used.
    pub wei_burned: u128,
    /// Wei tipped to the validator, summed over transactions with negative
    /// per-transaction tips clamped to zero.
    pub wei_tipped: u128,
    /// Mean tip per unit of gas, in wei. Zero for empty blocks.
    pub tip_per_gas: u128,
    /// The number of transactions in the block.
    pub transaction_count: u64,
    /// Spread of declared priority fees, when any transaction declares one.
    pub priority_fee_span: Option<PriorityFeeSpan>,
    /// The block's congestion bucket.
    pub congestion: CongestionBucket,
}

/// Non-fatal data-quality anomaly counts accumulated by a derivation pass.
///
/// No anomaly aborts the run; the engine favors best-effort aggregates with
/// counts over hard failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnomalyCounters {
    /// Raw records rejected by [`BlockRecord::validate`] and skipped.
    pub malformed_records: u64,
    /// Pairs whose `number` or `timestamp` regressed; their delta metrics are
    /// left undefined rather than computed against a non-adjacent predecessor.
    pub order_violations: u64,
    /// Transactions whose effective gas price fell below the base fee; their
    /// tips are clamped to zero.
    pub negative_tips: u64,
    /// Blocks whose fullness ratio exceeded 2.0 and was clamped to `full`.
    pub fullness_clamped: u64,
    /// Adjacent-number transitions whose observed base fee deviates from the
    /// protocol rule by more than 1 wei.
    pub rule_mismatches: u64,
}

impl AnomalyCounters {
    /// Total anomalies of all kinds.
    pub const fn total(&self) -> u64 {
        self.malformed_records
            + self.order_violations
            + self.negative_tips
            + self.fullness_clamped
            + self.rule_mismatches
    }
}

/// The output of a derivation pass: per-block metrics in input order plus
/// the anomaly counters accumulated along the way.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Derivation {
    /// Derived metrics, one per accepted raw record, in sequence order.
    pub metrics: Vec<BlockMetrics>,
    /// Anomalies observed while deriving.
    pub anomalies: AnomalyCounters,
}

/// Derives per-block metrics from an ordered sequence of raw records.
///
/// Pure and stateless: deriving the same input twice yields identical output.
/// Malformed records are skipped and counted; all other anomalies are counted
/// without dropping the block.
pub fn derive(blocks: &[BlockRecord]) -> Derivation {
    let mut metrics = Vec::with_capacity(blocks.len());
    let mut anomalies = AnomalyCounters::default();
    let mut prev: Option<&BlockRecord> = None;

    for block in blocks {
        if block.validate().is_err() {
            anomalies.malformed_records += 1;
            continue;
        }

        let ordered = prev
            .map(|p| block.number > p.number && block.timestamp >= p.timestamp)
            .unwrap_or(true);
        if prev.is_some() && !ordered {
            anomalies.order_violations += 1;
        }

        let base_fee_delta_pct = match prev {
            Some(p) if ordered && p.base_fee_per_gas > 0 => {
                let prev_fee = p.base_fee_per_gas as f64;
                Some((block.base_fee_per_gas as f64 - prev_fee) / prev_fee * 100.0)
            }
            _ => None,
        };
        let direction = base_fee_delta_pct.map(classify_direction);

        // The rule only predicts across adjacent block numbers; gaps in the
        // sample are tolerated but not validated.
        if let Some(p) = prev
            && ordered
            && block.number == p.number + 1
        {
            let predicted = next_base_fee(p.base_fee_per_gas, p.gas_used, p.gas_target());
            if predicted.abs_diff(block.base_fee_per_gas) > 1 {
                anomalies.rule_mismatches += 1;
            }
        }

        let fullness_ratio = block.fullness_ratio();
        if fullness_ratio > 2.0 {
            anomalies.fullness_clamped += 1;
        }

        let mut wei_tipped = 0u128;
        for tx in &block.transactions {
            match tx.effective_gas_price.checked_sub(block.base_fee_per_gas as u128) {
                Some(tip_per_gas) => wei_tipped += tip_per_gas * tx.gas_used as u128,
                None => anomalies.negative_tips += 1,
            }
        }

        let declared: Vec<u128> =
            block.transactions.iter().filter_map(|tx| tx.max_priority_fee_per_gas).collect();
        let priority_fee_span = (!declared.is_empty()).then(|| PriorityFeeSpan {
            min: declared.iter().copied().min().unwrap_or_default(),
            avg: declared.iter().sum::<u128>() / declared.len() as u128,
            max: declared.iter().copied().max().unwrap_or_default(),
        });

        metrics.push(BlockMetrics {
            number: block.number,
            timestamp: block.timestamp,
            base_fee_per_gas: block.base_fee_per_gas,
            gas_used: block.gas_used,
            gas_target: block.gas_target(),
            fullness_ratio,
            base_fee_delta_pct,
            direction,
            wei_burned: block.base_fee_per_gas as u128 * block.gas_used as u128,
            wei_tipped,
            tip_per_gas: if block.gas_used > 0 { wei_tipped / block.gas_used as u128 } else { 0 },
            transaction_count: block.transaction_count,
            priority_fee_span,
            congestion: CongestionBucket::from_fullness(fullness_ratio),
        });
        prev = Some(block);
    }

    Derivation { metrics, anomalies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::TxRecord;

    const GWEI: u64 = 1_000_000_000;
    const LIMIT: u64 = 30_000_000;
    const TARGET: u64 = 15_000_000;

    fn block(number: u64, base_fee: u64, gas_used: u64) -> BlockRecord {
        BlockRecord {
            number,
            timestamp: 1_700_000_000 + number * 12,
            base_fee_per_gas: base_fee,
            gas_used,
            gas_limit: LIMIT,
            transaction_count: 0,
            transactions: vec![],
        }
    }

    fn tx(gas_used: u64, effective_gas_price: u128) -> TxRecord {
        TxRecord { gas_used, effective_gas_price, ..Default::default() }
    }

    #[test]
    fn test_protocol_consistent_sequence_at_the_adjustment_bounds() {
        // At-target, then at-limit (+12.5% exactly), then empty (-12.5%).
        let b2_fee = next_base_fee(GWEI, LIMIT, TARGET);
        assert_eq!(b2_fee, 1_125_000_000);
        let b3_fee = next_base_fee(b2_fee, 0, TARGET);
        assert_eq!(b3_fee, b2_fee - b2_fee / 8);

        let blocks =
            vec![block(1, GWEI, TARGET), block(2, GWEI, LIMIT), block(3, b2_fee, 0)];
        // Block 1 is at target, so block 2 keeps its fee.
        let d = derive(&blocks);
        assert_eq!(d.anomalies.rule_mismatches, 0);
        assert_eq!(d.metrics[1].direction, Some(FeeDirection::Unchanged));
        assert_eq!(d.metrics[2].base_fee_delta_pct, Some(12.5));
        assert_eq!(d.metrics[2].direction, Some(FeeDirection::Increase));
    }

    #[test]
    fn test_half_over_target_moves_a_sixteenth() {
        // 22.5M gas over a 15M target is 50% excess: a 6.25% step.
        assert_eq!(next_base_fee(GWEI, 22_500_000, TARGET), GWEI + GWEI / 16);
        assert_eq!(next_base_fee(GWEI, 7_500_000, TARGET), GWEI - GWEI / 16);
    }

    #[test]
    fn test_empty_block_metrics() {
        let blocks = vec![block(1, GWEI, TARGET), block(2, GWEI, 0)];
        let d = derive(&blocks);
        let empty = &d.metrics[1];
        assert_eq!(empty.fullness_ratio, 0.0);
        assert_eq!(empty.congestion, CongestionBucket::Empty);
        assert_eq!(empty.wei_burned, 0);
        assert_eq!(empty.tip_per_gas, 0);
        // The fee computed from the empty block drops by exactly 12.5%.
        assert_eq!(next_base_fee(empty.base_fee_per_gas, empty.gas_used, TARGET), GWEI - GWEI / 8);
    }

    #[test]
    fn test_tip_at_base_fee_contributes_zero_without_anomaly() {
        let mut b = block(1, GWEI, 21_000);
        b.transaction_count = 1;
        b.transactions = vec![tx(21_000, GWEI as u128)];
        let d = derive(&[b]);
        assert_eq!(d.metrics[0].wei_tipped, 0);
        assert_eq!(d.anomalies.negative_tips, 0);
    }

    #[test]
    fn test_negative_tip_is_clamped_and_counted_once() {
        let mut b = block(1, GWEI, 42_000);
        b.transaction_count = 2;
        b.transactions = vec![tx(21_000, GWEI as u128 - 1), tx(21_000, GWEI as u128 + 2)];
        let d = derive(&[b]);
        assert_eq!(d.anomalies.negative_tips, 1);
        // Only the well-formed transaction contributes.
        assert_eq!(d.metrics[0].wei_tipped, 2 * 21_000);
    }

    #[test]
    fn test_tip_accounting_per_transaction() {
        let mut b = block(1, 2 * GWEI, 100_000);
        b.transaction_count = 2;
        b.transactions =
            vec![tx(60_000, (2 * GWEI + 3) as u128), tx(40_000, (2 * GWEI + 5) as u128)];
        let d = derive(&[b]);
        assert_eq!(d.metrics[0].wei_tipped, 3 * 60_000 + 5 * 40_000);
        assert_eq!(d.metrics[0].tip_per_gas, (3 * 60_000 + 5 * 40_000) / 100_000);
    }

    #[test]
    fn test_first_block_has_no_delta() {
        let d = derive(&[block(1, GWEI, TARGET)]);
        assert_eq!(d.metrics[0].base_fee_delta_pct, None);
        assert_eq!(d.metrics[0].direction, None);
    }

    #[test]
    fn test_order_violation_leaves_delta_undefined() {
        let blocks = vec![block(5, GWEI, TARGET), block(3, GWEI / 2, TARGET)];
        let d = derive(&blocks);
        assert_eq!(d.anomalies.order_violations, 1);
        assert_eq!(d.metrics[1].base_fee_delta_pct, None);
        assert_eq!(d.metrics[1].direction, None);
        // The offending record is kept, not reordered or dropped.
        assert_eq!(d.metrics.len(), 2);
    }

    #[test]
    fn test_timestamp_regression_is_an_order_violation() {
        let mut late = block(2, GWEI, TARGET);
        late.timestamp = 0;
        let d = derive(&[block(1, GWEI, TARGET), late]);
        assert_eq!(d.anomalies.order_violations, 1);
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let bad = BlockRecord { number: 2, gas_limit: 0, ..Default::default() };
        let blocks = vec![block(1, GWEI, TARGET), bad, block(3, GWEI, TARGET)];
        let d = derive(&blocks);
        assert_eq!(d.anomalies.malformed_records, 1);
        assert_eq!(d.metrics.len(), 2);
        // Block 3 deltas against block 1, the last accepted record.
        assert_eq!(d.metrics[1].base_fee_delta_pct, Some(0.0));
    }

    #[test]
    fn test_number_gap_skips_rule_check_but_keeps_delta() {
        // A gap means the observed transition spans unseen blocks; the rule
        // cannot predict across it.
        let blocks = vec![block(1, GWEI, LIMIT), block(7, 42, TARGET)];
        let d = derive(&blocks);
        assert_eq!(d.anomalies.rule_mismatches, 0);
        assert!(d.metrics[1].base_fee_delta_pct.is_some());
    }

    #[test]
    fn test_rule_mismatch_detected_on_adjacent_numbers() {
        // Block 1 at the limit predicts +12.5%, but block 2 reports no change.
        let blocks = vec![block(1, GWEI, LIMIT), block(2, GWEI, TARGET)];
        let d = derive(&blocks);
        assert_eq!(d.anomalies.rule_mismatches, 1);
    }

    #[test]
    fn test_rule_check_tolerates_one_wei_of_rounding() {
        let predicted = next_base_fee(GWEI, 20_000_000, TARGET);
        let blocks = vec![block(1, GWEI, 20_000_000), block(2, predicted + 1, TARGET)];
        assert_eq!(derive(&blocks).anomalies.rule_mismatches, 0);
    }

    #[test]
    fn test_over_limit_fullness_clamps_and_counts() {
        let mut b = block(2, GWEI, LIMIT + 1);
        b.timestamp = 1_700_000_100;
        let d = derive(&[block(1, GWEI, TARGET), b]);
        assert_eq!(d.anomalies.fullness_clamped, 1);
        assert_eq!(d.metrics[1].congestion, CongestionBucket::Full);
    }

    #[test]
    fn test_priority_fee_span() {
        let mut b = block(1, GWEI, 63_000);
        b.transaction_count = 3;
        b.transactions = vec![
            TxRecord {
                gas_used: 21_000,
                effective_gas_price: GWEI as u128 + 2,
                max_priority_fee_per_gas: Some(2),
                max_fee_per_gas: Some(2 * GWEI as u128),
            },
            TxRecord {
                gas_used: 21_000,
                effective_gas_price: GWEI as u128 + 8,
                max_priority_fee_per_gas: Some(8),
                max_fee_per_gas: Some(2 * GWEI as u128),
            },
            // Legacy transaction: no declared caps.
            tx(21_000, GWEI as u128 + 4),
        ];
        let span = derive(&[b]).metrics[0].priority_fee_span.unwrap();
        assert_eq!(span, PriorityFeeSpan { min: 2, avg: 5, max: 8 });
    }

    #[test]
    fn test_no_typed_transactions_yields_no_span() {
        let mut b = block(1, GWEI, 21_000);
        b.transaction_count = 1;
        b.transactions = vec![tx(21_000, GWEI as u128)];
        assert_eq!(derive(&[b]).metrics[0].priority_fee_span, None);
    }

    #[test]
    fn test_derive_is_idempotent() {
        let mut b = block(2, GWEI + GWEI / 8, LIMIT);
        b.transaction_count = 1;
        b.transactions = vec![tx(21_000, (GWEI + GWEI / 8 + 3) as u128)];
        let blocks = vec![block(1, GWEI, LIMIT), b];
        assert_eq!(derive(&blocks), derive(&blocks));
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let d = derive(&[]);
        assert!(d.metrics.is_empty());
        assert_eq!(d.anomalies.total(), 0);
    }
}
