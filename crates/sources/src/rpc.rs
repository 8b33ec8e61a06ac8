//! RPC block source backed by an alloy provider.

use crate::{
    config::SourceConfig,
    errors::{SourceError, SourceResult},
};
use alloy_consensus::{BlockHeader, Transaction};
use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::{Block, TransactionReceipt};
use backon::{ExponentialBuilder, Retryable};
use feescope_mechanics::{BlockRecord, TxRecord};
use tracing::{info, warn};

/// Fetch progress is logged once per this many blocks.
const PROGRESS_LOG_INTERVAL: usize = 10;

/// Fetches raw block records from an Ethereum execution client.
///
/// Each block costs two RPC calls: the block with full transactions, and the
/// block's receipts (the only source of per-transaction gas usage and
/// effective gas price). Individual calls are retried with exponential
/// backoff; a block that still fails is skipped and logged, never fatal to
/// the range.
#[derive(Debug, Clone)]
pub struct RpcBlockSource<P> {
    provider: P,
    config: SourceConfig,
}

impl RpcBlockSource<RootProvider> {
    /// Connects to the first reachable configured endpoint, probing each with
    /// a `eth_blockNumber` call. The fallback endpoint, when present, is only
    /// tried after the primary fails the probe.
    pub async fn connect(config: SourceConfig) -> SourceResult<Self> {
        let endpoints: Vec<_> = core::iter::once(&config.rpc_url)
            .chain(config.fallback_rpc_url.as_ref())
            .cloned()
            .collect();
        let total = endpoints.len();
        let probe_timeout = config.request_timeout;
        for url in endpoints {
            let provider = RootProvider::new_http(url.clone());
            match tokio::time::timeout(probe_timeout, provider.get_block_number()).await {
                Ok(Ok(latest)) => {
                    info!(endpoint = %url, latest, "connected to execution client");
                    return Ok(Self::new(provider, config));
                }
                Ok(Err(err)) => warn!(endpoint = %url, %err, "endpoint failed connection probe"),
                Err(_) => warn!(endpoint = %url, "connection probe timed out"),
            }
        }
        Err(SourceError::NoReachableEndpoint(total))
    }
}

impl<P: Provider> RpcBlockSource<P> {
    /// Creates a source over an existing provider.
    pub const fn new(provider: P, config: SourceConfig) -> Self {
        Self { provider, config }
    }

    /// Returns the latest block number known to the endpoint.
    pub async fn latest_block_number(&self) -> SourceResult<u64> {
        let timeout = self.config.request_timeout;
        tokio::time::timeout(timeout, self.provider.get_block_number())
            .await
            .map_err(|_| SourceError::Timeout(timeout))?
            .map_err(Into::into)
    }

    /// Fetches an inclusive range of blocks in ascending order.
    ///
    /// Blocks that keep failing after retries are skipped with a warning so
    /// one bad block cannot abort a long collection run; the caller sees the
    /// gap as a shorter result.
    pub async fn fetch_range(&self, start: u64, end: u64) -> SourceResult<Vec<BlockRecord>> {
        if start > end {
            return Ok(Vec::new());
        }
        let total = (end - start + 1) as usize;
        info!(start, end, total, "fetching block range");

        let mut blocks = Vec::with_capacity(total);
        for (i, number) in (start..=end).enumerate() {
            match self.fetch_block(number).await {
                Ok(record) => blocks.push(record),
                Err(err) => warn!(number, %err, "skipping block after exhausted retries"),
            }
            let scanned = i + 1;
            if scanned % PROGRESS_LOG_INTERVAL == 0 || scanned == total {
                info!(fetched = blocks.len(), scanned, total, "fetch progress");
            }
        }
        info!(fetched = blocks.len(), total, "fetched block range");
        Ok(blocks)
    }

    /// Fetches a single block record, retrying transport failures and
    /// timeouts with exponential backoff.
    pub async fn fetch_block(&self, number: u64) -> SourceResult<BlockRecord> {
        let attempt = || async { self.fetch_block_once(number).await };
        attempt
            .retry(self.backoff())
            .when(|err| matches!(err, SourceError::Transport(_) | SourceError::Timeout(_)))
            .notify(|err, delay| warn!(number, %err, ?delay, "block fetch failed, retrying"))
            .await
    }

    async fn fetch_block_once(&self, number: u64) -> SourceResult<BlockRecord> {
        let timeout = self.config.request_timeout;
        let block = tokio::time::timeout(
            timeout,
            self.provider.get_block_by_number(BlockNumberOrTag::Number(number)).full(),
        )
        .await
        .map_err(|_| SourceError::Timeout(timeout))??
        .ok_or(SourceError::BlockNotFound(number))?;

        let receipts = tokio::time::timeout(
            timeout,
            self.provider.get_block_receipts(BlockId::number(number)),
        )
        .await
        .map_err(|_| SourceError::Timeout(timeout))??
        .ok_or(SourceError::MissingReceipts(number))?;

        into_record(&block, &receipts)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.config.retry_delay)
            .with_max_times(self.config.retry_attempts.saturating_sub(1))
    }
}

/// Merges a block and its receipts into a raw record.
///
/// Receipts and transactions are paired by index, the order both are returned
/// in by the execution client.
fn into_record(block: &Block, receipts: &[TransactionReceipt]) -> SourceResult<BlockRecord> {
    let header = &block.header;
    let number = header.number();
    let base_fee_per_gas = header.base_fee_per_gas().ok_or(SourceError::PreLondon(number))?;

    if block.transactions.len() != receipts.len() {
        warn!(
            number,
            transactions = block.transactions.len(),
            receipts = receipts.len(),
            "transaction/receipt count mismatch, pairing by shortest"
        );
    }

    let transactions: Vec<TxRecord> = block
        .transactions
        .txns()
        .zip(receipts.iter())
        .map(|(tx, receipt)| TxRecord {
            gas_used: receipt.gas_used,
            effective_gas_price: receipt.effective_gas_price,
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas(),
            max_fee_per_gas: tx.is_dynamic_fee().then(|| tx.max_fee_per_gas()),
        })
        .collect();

    Ok(BlockRecord {
        number,
        timestamp: header.timestamp(),
        base_fee_per_gas,
        gas_used: header.gas_used(),
        gas_limit: header.gas_limit(),
        transaction_count: transactions.len() as u64,
        transactions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rpc_types_eth::BlockTransactions;

    fn header(number: u64, base_fee: Option<u64>) -> alloy_rpc_types_eth::Header {
        let inner = alloy_consensus::Header {
            number,
            timestamp: 1_700_000_000,
            base_fee_per_gas: base_fee,
            gas_used: 14_000_000,
            gas_limit: 30_000_000,
            ..Default::default()
        };
        alloy_rpc_types_eth::Header { inner, ..Default::default() }
    }

    #[test]
    fn test_into_record_maps_header_fields() {
        let block = Block {
            header: header(100, Some(7_000_000_000)),
            transactions: BlockTransactions::Full(vec![]),
            ..Default::default()
        };
        let record = into_record(&block, &[]).unwrap();
        assert_eq!(record.number, 100);
        assert_eq!(record.base_fee_per_gas, 7_000_000_000);
        assert_eq!(record.gas_used, 14_000_000);
        assert_eq!(record.gas_limit, 30_000_000);
        assert_eq!(record.transaction_count, 0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_into_record_rejects_pre_london_blocks() {
        let block = Block {
            header: header(12_000_000, None),
            transactions: BlockTransactions::Full(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            into_record(&block, &[]),
            Err(SourceError::PreLondon(12_000_000))
        ));
    }
}
