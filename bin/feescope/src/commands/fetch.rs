//! `fetch` subcommand.

use anyhow::{Result, bail};
use clap::Parser;
use feescope_sources::{BlockStore, RpcBlockSource, SourceConfig};
use std::{path::PathBuf, time::Duration};
use tracing::info;
use url::Url;

/// Fetches a block range from an execution client and writes the raw dataset.
#[derive(Parser, Debug, Clone)]
#[command(about = "Fetch a range of blocks over RPC into the dataset file")]
pub struct FetchCommand {
    /// URL of the execution client's JSON-RPC endpoint.
    #[arg(long, env = "FEESCOPE_RPC_URL")]
    pub rpc_url: Url,
    /// Optional fallback endpoint, tried when the primary is unreachable.
    #[arg(long, env = "FEESCOPE_FALLBACK_RPC_URL")]
    pub fallback_rpc_url: Option<Url>,
    /// Number of most recent blocks to fetch, counted back from the head.
    #[arg(long, default_value_t = 100, conflicts_with_all = ["start", "end"])]
    pub blocks: u64,
    /// First block of an explicit range.
    #[arg(long, requires = "end")]
    pub start: Option<u64>,
    /// Last block of an explicit range, inclusive.
    #[arg(long, requires = "start")]
    pub end: Option<u64>,
    /// Path of the dataset file to write.
    #[arg(long, default_value = "data/blocks.json")]
    pub data: PathBuf,
    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
    /// Attempts per RPC call before a block is skipped.
    #[arg(long, default_value_t = 3)]
    pub retry_attempts: usize,
}

impl FetchCommand {
    /// Runs the subcommand.
    pub async fn run(self) -> Result<()> {
        let mut config = SourceConfig::new(self.rpc_url)
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_retries(self.retry_attempts, Duration::from_secs(2));
        if let Some(fallback) = self.fallback_rpc_url {
            config = config.with_fallback(fallback);
        }

        let source = RpcBlockSource::connect(config).await?;
        let (start, end) = match (self.start, self.end) {
            (Some(start), Some(end)) => {
                if start > end {
                    bail!("--start {start} is past --end {end}");
                }
                (start, end)
            }
            _ => {
                if self.blocks == 0 {
                    bail!("--blocks must be at least 1");
                }
                let head = source.latest_block_number().await?;
                (head.saturating_sub(self.blocks - 1), head)
            }
        };

        let blocks = source.fetch_range(start, end).await?;
        if blocks.is_empty() {
            bail!("no blocks fetched from {}..={}", start, end);
        }
        BlockStore::new(&self.data).save(&blocks)?;
        info!(blocks = blocks.len(), path = %self.data.display(), "dataset ready");
        Ok(())
    }
}
