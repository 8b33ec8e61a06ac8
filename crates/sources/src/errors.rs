//! Error types for block-data collaborators.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while sourcing or persisting block data.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The RPC transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] alloy_transport::TransportError),
    /// A request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The endpoint does not know the requested block.
    #[error("block {0} not found")]
    BlockNotFound(u64),
    /// The endpoint returned no receipts for the block.
    #[error("no receipts available for block {0}")]
    MissingReceipts(u64),
    /// The block predates EIP-1559 and carries no base fee.
    #[error("block {0} predates the london hard fork and has no base fee")]
    PreLondon(u64),
    /// No configured endpoint accepted the connection probe.
    #[error("no reachable endpoint among {0} configured")]
    NoReachableEndpoint(usize),
    /// Reading or writing the dataset file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Encoding or decoding the dataset failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Type alias for source results.
pub type SourceResult<T> = Result<T, SourceError>;
