//! Aggregate statistics over a derived block sequence.

use crate::{
    basefee::FeeDirection,
    congestion::CongestionBucket,
    derive::{AnomalyCounters, BlockMetrics, Derivation},
};

/// Descriptive statistics over a set of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (midpoint mean for even sample counts).
    pub median: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Population standard deviation.
    pub stddev: f64,
}

impl DistStats {
    /// Computes statistics over the samples. All-zero for an empty slice.
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>() / n;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self { mean, median, min: sorted[0], max: sorted[sorted.len() - 1], stddev: variance.sqrt() }
    }
}

/// Counts of observed base-fee transition directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectionSplit {
    /// Transitions where the base fee rose.
    pub increases: u64,
    /// Transitions where the base fee fell.
    pub decreases: u64,
    /// Transitions where the base fee held.
    pub unchanged: u64,
}

impl DirectionSplit {
    /// The number of blocks with a defined transition direction.
    pub const fn classified(&self) -> u64 {
        self.increases + self.decreases + self.unchanged
    }

    /// Percentage of classified transitions in the given direction.
    pub fn pct(&self, direction: FeeDirection) -> f64 {
        let total = self.classified();
        if total == 0 {
            return 0.0;
        }
        let count = match direction {
            FeeDirection::Increase => self.increases,
            FeeDirection::Decrease => self.decreases,
            FeeDirection::Unchanged => self.unchanged,
        };
        count as f64 / total as f64 * 100.0
    }
}

/// Counts of blocks relative to their gas target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasTargetSplit {
    /// Blocks that used more gas than the target.
    pub above: u64,
    /// Blocks that used less gas than the target.
    pub below: u64,
    /// Blocks exactly at the target.
    pub at: u64,
}

/// Per-bucket aggregates supporting the burn-vs-tips congestion comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BucketRow {
    /// The congestion bucket.
    pub bucket: CongestionBucket,
    /// Blocks classified into the bucket.
    pub blocks: u64,
    /// Mean tip per gas across the bucket's blocks, in wei.
    pub mean_tip_per_gas: f64,
    /// Mean wei burned per block across the bucket's blocks.
    pub mean_wei_burned: f64,
}

/// The aggregate report over a derived window. Recomputed in full from the
/// derived sequence on each invocation; holds no independent state.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeReport {
    /// Blocks covered by the report.
    pub blocks: u64,
    /// Fullness-ratio statistics (0-2 scale).
    pub fullness: DistStats,
    /// Base-fee statistics, in wei per gas.
    pub base_fee: DistStats,
    /// Tip-per-gas statistics, in wei per gas.
    pub tip_per_gas: DistStats,
    /// Wei-burned-per-block statistics.
    pub wei_burned: DistStats,
    /// Wei-tipped-per-block statistics.
    pub wei_tipped: DistStats,
    /// Transactions-per-block statistics.
    pub tx_count: DistStats,
    /// Observed base-fee transition directions.
    pub direction_split: DirectionSplit,
    /// Blocks above, below, and at the gas target.
    pub gas_target_split: GasTargetSplit,
    /// Total wei burned over the window.
    pub total_wei_burned: u128,
    /// Total wei tipped over the window.
    pub total_wei_tipped: u128,
    /// Burned minus tipped over the window. Positive means net deflationary
    /// pressure for the sampled window; block rewards are out of scope.
    pub net_wei_supply_change: i128,
    /// Total burn over total tips. `None` when nothing was tipped.
    pub burn_tip_ratio: Option<f64>,
    /// Blocks whose mean tip per gas exceeded the base fee.
    pub tip_dominant_blocks: u64,
    /// Per-bucket aggregates, in ascending fullness order.
    pub congestion_breakdown: Vec<BucketRow>,
    /// Data-quality anomalies observed while deriving.
    pub anomalies: AnomalyCounters,
}

/// Reduces a derivation into an aggregate report.
///
/// A pure reduction: no state is retained between invocations and the input
/// is not mutated.
pub fn summarize(derivation: &Derivation) -> FeeReport {
    let metrics = &derivation.metrics;

    let mut direction_split = DirectionSplit::default();
    for m in metrics {
        match m.direction {
            Some(FeeDirection::Increase) => direction_split.increases += 1,
            Some(FeeDirection::Decrease) => direction_split.decreases += 1,
            Some(FeeDirection::Unchanged) => direction_split.unchanged += 1,
            None => {}
        }
    }

    let mut gas_target_split = GasTargetSplit::default();
    for m in metrics {
        match m.gas_used.cmp(&m.gas_target) {
            core::cmp::Ordering::Greater => gas_target_split.above += 1,
            core::cmp::Ordering::Less => gas_target_split.below += 1,
            core::cmp::Ordering::Equal => gas_target_split.at += 1,
        }
    }

    let total_wei_burned: u128 = metrics.iter().map(|m| m.wei_burned).sum();
    let total_wei_tipped: u128 = metrics.iter().map(|m| m.wei_tipped).sum();

    let congestion_breakdown = CongestionBucket::all()
        .into_iter()
        .map(|bucket| {
            let in_bucket: Vec<&BlockMetrics> =
                metrics.iter().filter(|m| m.congestion == bucket).collect();
            let blocks = in_bucket.len() as u64;
            let mean = |f: fn(&BlockMetrics) -> u128| {
                if in_bucket.is_empty() {
                    0.0
                } else {
                    in_bucket.iter().map(|m| f(m) as f64).sum::<f64>() / in_bucket.len() as f64
                }
            };
            BucketRow {
                bucket,
                blocks,
                mean_tip_per_gas: mean(|m| m.tip_per_gas),
                mean_wei_burned: mean(|m| m.wei_burned),
            }
        })
        .collect();

    let samples = |f: fn(&BlockMetrics) -> f64| -> Vec<f64> { metrics.iter().map(f).collect() };

    FeeReport {
        blocks: metrics.len() as u64,
        fullness: DistStats::from_samples(&samples(|m| m.fullness_ratio)),
        base_fee: DistStats::from_samples(&samples(|m| m.base_fee_per_gas as f64)),
        tip_per_gas: DistStats::from_samples(&samples(|m| m.tip_per_gas as f64)),
        wei_burned: DistStats::from_samples(&samples(|m| m.wei_burned as f64)),
        wei_tipped: DistStats::from_samples(&samples(|m| m.wei_tipped as f64)),
        tx_count: DistStats::from_samples(&samples(|m| m.transaction_count as f64)),
        direction_split,
        gas_target_split,
        total_wei_burned,
        total_wei_tipped,
        net_wei_supply_change: total_wei_burned as i128 - total_wei_tipped as i128,
        burn_tip_ratio: (total_wei_tipped > 0)
            .then(|| total_wei_burned as f64 / total_wei_tipped as f64),
        tip_dominant_blocks: metrics
            .iter()
            .filter(|m| m.tip_per_gas > m.base_fee_per_gas as u128)
            .count() as u64,
        congestion_breakdown,
        anomalies: derivation.anomalies,
    }
}
