//! Table builders over an aggregate fee report.

use crate::format::{fmt_eth, fmt_gwei};
use feescope_mechanics::{DistStats, FeeDirection, FeeReport};
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Median")]
    median: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Std dev")]
    stddev: String,
}

impl StatRow {
    fn new(metric: &str, stats: &DistStats, fmt: fn(f64) -> String) -> Self {
        Self {
            metric: metric.to_string(),
            mean: fmt(stats.mean),
            median: fmt(stats.median),
            min: fmt(stats.min),
            max: fmt(stats.max),
            stddev: fmt(stats.stddev),
        }
    }
}

/// Builds the per-metric statistics table.
pub fn summary_table(report: &FeeReport) -> Table {
    let ratio = |v: f64| format!("{v:.4}");
    let count = |v: f64| format!("{v:.1}");
    let rows = vec![
        StatRow::new("Fullness ratio (target = 1.0)", &report.fullness, ratio),
        StatRow::new("Base fee (gwei)", &report.base_fee, fmt_gwei),
        StatRow::new("Tip per gas (gwei)", &report.tip_per_gas, fmt_gwei),
        StatRow::new("Burned per block (ETH)", &report.wei_burned, fmt_eth),
        StatRow::new("Tipped per block (ETH)", &report.wei_tipped, fmt_eth),
        StatRow::new("Transactions per block", &report.tx_count, count),
    ];
    styled(Table::new(rows))
}

#[derive(Tabled)]
struct DirectionRow {
    #[tabled(rename = "Base fee direction")]
    direction: String,
    #[tabled(rename = "Blocks")]
    blocks: u64,
    #[tabled(rename = "Share")]
    share: String,
}

/// Builds the base-fee direction split table.
pub fn direction_table(report: &FeeReport) -> Table {
    let split = &report.direction_split;
    let row = |direction: FeeDirection, blocks: u64| DirectionRow {
        direction: direction.to_string(),
        blocks,
        share: format!("{:.1}%", split.pct(direction)),
    };
    let rows = vec![
        row(FeeDirection::Increase, split.increases),
        row(FeeDirection::Decrease, split.decreases),
        row(FeeDirection::Unchanged, split.unchanged),
    ];
    styled(Table::new(rows))
}

#[derive(Tabled)]
struct BucketTableRow {
    #[tabled(rename = "Congestion")]
    bucket: String,
    #[tabled(rename = "Blocks")]
    blocks: u64,
    #[tabled(rename = "Mean tip (gwei)")]
    mean_tip: String,
    #[tabled(rename = "Mean burn (ETH)")]
    mean_burn: String,
}

/// Builds the congestion breakdown table: block counts with mean tip and
/// mean burn per bucket, the tips-vs-burn-under-congestion comparison.
pub fn congestion_table(report: &FeeReport) -> Table {
    let rows: Vec<BucketTableRow> = report
        .congestion_breakdown
        .iter()
        .map(|row| BucketTableRow {
            bucket: row.bucket.to_string(),
            blocks: row.blocks,
            mean_tip: fmt_gwei(row.mean_tip_per_gas),
            mean_burn: fmt_eth(row.mean_wei_burned),
        })
        .collect();
    styled(Table::new(rows))
}

#[derive(Tabled)]
struct KeyValueRow {
    #[tabled(rename = "Economics")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Builds the validator-economics table for the sampled window.
pub fn economics_table(report: &FeeReport) -> Table {
    let kv = |key: &str, value: String| KeyValueRow { key: key.to_string(), value };
    let rows = vec![
        kv("Total burned (ETH)", fmt_eth(report.total_wei_burned as f64)),
        kv("Total tipped (ETH)", fmt_eth(report.total_wei_tipped as f64)),
        kv(
            "Net supply change (ETH, sampled window)",
            format!("{:.6}", crate::format::eth_signed(report.net_wei_supply_change)),
        ),
        kv(
            "Burn / tip ratio",
            report
                .burn_tip_ratio
                .map(|r| format!("{r:.2}:1"))
                .unwrap_or_else(|| "n/a".to_string()),
        ),
        kv("Blocks where tips beat base fee", report.tip_dominant_blocks.to_string()),
        kv(
            "Blocks above / below / at gas target",
            format!(
                "{} / {} / {}",
                report.gas_target_split.above,
                report.gas_target_split.below,
                report.gas_target_split.at
            ),
        ),
    ];
    styled(Table::new(rows))
}

#[derive(Tabled)]
struct AnomalyRow {
    #[tabled(rename = "Data-quality anomaly")]
    anomaly: String,
    #[tabled(rename = "Count")]
    count: u64,
}

/// Builds the anomaly counter table.
pub fn anomaly_table(report: &FeeReport) -> Table {
    let a = &report.anomalies;
    let rows = vec![
        AnomalyRow { anomaly: "Malformed records skipped".to_string(), count: a.malformed_records },
        AnomalyRow { anomaly: "Sequence order violations".to_string(), count: a.order_violations },
        AnomalyRow { anomaly: "Negative tips clamped".to_string(), count: a.negative_tips },
        AnomalyRow { anomaly: "Fullness ratios clamped".to_string(), count: a.fullness_clamped },
        AnomalyRow { anomaly: "Protocol rule mismatches".to_string(), count: a.rule_mismatches },
    ];
    styled(Table::new(rows))
}

fn styled(mut table: Table) -> Table {
    table.with(Style::modern());
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use feescope_mechanics::{BlockRecord, derive, summarize};

    fn report() -> FeeReport {
        let blocks = vec![
            BlockRecord {
                number: 1,
                timestamp: 1_700_000_000,
                base_fee_per_gas: 1_000_000_000,
                gas_used: 15_000_000,
                gas_limit: 30_000_000,
                ..Default::default()
            },
            BlockRecord {
                number: 2,
                timestamp: 1_700_000_012,
                base_fee_per_gas: 1_000_000_000,
                gas_used: 30_000_000,
                gas_limit: 30_000_000,
                ..Default::default()
            },
        ];
        summarize(&derive(&blocks))
    }

    #[test]
    fn test_summary_table_renders_all_metrics() {
        let rendered = summary_table(&report()).to_string();
        assert!(rendered.contains("Fullness ratio"));
        assert!(rendered.contains("Base fee (gwei)"));
        assert!(rendered.contains("Transactions per block"));
    }

    #[test]
    fn test_direction_table_lists_every_direction() {
        let rendered = direction_table(&report()).to_string();
        for direction in ["increase", "decrease", "unchanged"] {
            assert!(rendered.contains(direction), "missing {direction} in {rendered}");
        }
        assert!(rendered.contains("100.0%"));
    }

    #[test]
    fn test_congestion_table_lists_every_bucket() {
        let rendered = congestion_table(&report()).to_string();
        for bucket in ["empty", "low", "medium", "high", "full"] {
            assert!(rendered.contains(bucket), "missing {bucket} in {rendered}");
        }
    }

    #[test]
    fn test_economics_table_reports_totals() {
        let rendered = economics_table(&report()).to_string();
        assert!(rendered.contains("Total burned (ETH)"));
        // 1 gwei * 45M gas across both blocks.
        assert!(rendered.contains("0.045000"));
        assert!(rendered.contains("n/a"));
    }

    #[test]
    fn test_anomaly_table_is_all_zero_for_clean_data() {
        let rendered = anomaly_table(&report()).to_string();
        assert!(rendered.contains("Malformed records skipped"));
        assert!(!rendered.contains('1'), "unexpected anomaly count in {rendered}");
    }
}
