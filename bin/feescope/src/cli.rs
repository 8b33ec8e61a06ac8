//! The feescope CLI.

use crate::{commands::Commands, flags::GlobalArgs};
use anyhow::Result;
use clap::Parser;

/// The feescope CLI: collect Ethereum block data and report on the EIP-1559
/// fee market.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global arguments.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        self.global.init_tracing()?;
        match self.command {
            Commands::Fetch(cmd) => Self::block_on(cmd.run()),
            Commands::Analyze(cmd) => cmd.run(),
            Commands::Forecast(cmd) => cmd.run(),
        }
    }

    /// Runs an async command to completion on a fresh runtime.
    fn block_on<F: Future<Output = Result<()>>>(fut: F) -> Result<()> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()?.block_on(fut)
    }
}
