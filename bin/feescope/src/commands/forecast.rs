//! `forecast` subcommand.

use anyhow::{Context, Result, bail};
use clap::Parser;
use feescope_mechanics::next_base_fee;
use feescope_report::fmt_gwei;
use feescope_sources::BlockStore;
use std::path::PathBuf;

/// Predicts the next block's base fee from the last block of the dataset.
#[derive(Parser, Debug, Clone)]
#[command(about = "Forecast the next base fee from the tail of the dataset")]
pub struct ForecastCommand {
    /// Path of the dataset file to read.
    #[arg(long, default_value = "data/blocks.json")]
    pub data: PathBuf,
}

impl ForecastCommand {
    /// Runs the subcommand.
    pub fn run(self) -> Result<()> {
        let blocks = BlockStore::new(&self.data)
            .load()
            .with_context(|| format!("reading dataset {}", self.data.display()))?;
        let Some(tip) = blocks.iter().rev().find(|b| b.validate().is_ok()) else {
            bail!("dataset {} holds no usable blocks", self.data.display());
        };

        let predicted = next_base_fee(tip.base_fee_per_gas, tip.gas_used, tip.gas_target());
        println!(
            "Block {} base fee: {} gwei ({:.2}% of target gas used)",
            tip.number,
            fmt_gwei(tip.base_fee_per_gas as f64),
            tip.fullness_ratio() * 100.0,
        );
        println!("Predicted block {} base fee: {} gwei", tip.number + 1, fmt_gwei(predicted as f64));
        Ok(())
    }
}
