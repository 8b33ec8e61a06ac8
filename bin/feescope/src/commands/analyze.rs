//! `analyze` subcommand.

use anyhow::{Context, Result};
use clap::Parser;
use feescope_mechanics::{derive, summarize};
use feescope_report::{
    anomaly_table, congestion_table, direction_table, economics_table, summary_table,
};
use feescope_sources::BlockStore;
use std::path::PathBuf;
use tracing::info;

/// Derives fee metrics from the stored dataset and prints the report.
#[derive(Parser, Debug, Clone)]
#[command(about = "Derive fee metrics from the dataset and print the report")]
pub struct AnalyzeCommand {
    /// Path of the dataset file to read.
    #[arg(long, default_value = "data/blocks.json")]
    pub data: PathBuf,
    /// Emit the full report as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let blocks = BlockStore::new(&self.data)
            .load()
            .with_context(|| format!("reading dataset {}", self.data.display()))?;
        let derivation = derive(&blocks);
        let report = summarize(&derivation);
        info!(
            blocks = report.blocks,
            anomalies = report.anomalies.total(),
            "derived metrics from dataset"
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Window: {} blocks\n", report.blocks);
        println!("{}\n", summary_table(&report));
        println!("{}\n", direction_table(&report));
        println!("{}\n", congestion_table(&report));
        println!("{}\n", economics_table(&report));
        println!("{}", anomaly_table(&report));
        Ok(())
    }
}
