//! feescope: an EIP-1559 fee-market observatory for Ethereum mainnet.

use clap::Parser;

pub mod cli;
pub mod commands;
pub mod flags;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
