//! Raw block and transaction records supplied by an external data source.

use crate::basefee::ELASTICITY_MULTIPLIER;
use thiserror::Error;

/// A single transaction observation within a block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxRecord {
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// The price per gas actually paid, in wei.
    pub effective_gas_price: u128,
    /// The declared priority fee cap, in wei. `None` for pre-EIP-1559 transactions.
    pub max_priority_fee_per_gas: Option<u128>,
    /// The declared total fee cap, in wei. `None` for pre-EIP-1559 transactions.
    pub max_fee_per_gas: Option<u128>,
}

/// A raw per-block record, immutable once produced.
///
/// Records are expected in sequence order: `number` strictly increasing,
/// `timestamp` non-decreasing. Gaps in block numbers are tolerated; delta
/// computations always use the immediately preceding element of the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockRecord {
    /// The block number.
    pub number: u64,
    /// The block timestamp, in seconds since the epoch.
    pub timestamp: u64,
    /// The block's base fee per gas, in wei.
    pub base_fee_per_gas: u64,
    /// Total gas consumed by the block.
    pub gas_used: u64,
    /// The block's gas limit.
    pub gas_limit: u64,
    /// The number of transactions in the block.
    pub transaction_count: u64,
    /// The block's transactions, in block order.
    pub transactions: Vec<TxRecord>,
}

impl BlockRecord {
    /// Returns the gas target: half of the gas limit.
    pub const fn gas_target(&self) -> u64 {
        self.gas_limit / ELASTICITY_MULTIPLIER
    }

    /// Returns the fullness ratio on the 0-2 scale: 1.0 is exactly at target,
    /// 2.0 is at the gas limit.
    ///
    /// Only meaningful for records that pass [`Self::validate`]; a zero gas
    /// target would make the ratio undefined.
    pub fn fullness_ratio(&self) -> f64 {
        self.gas_used as f64 / self.gas_target() as f64
    }

    /// Checks structural soundness of the record.
    ///
    /// A failing record is rejected by the derivation pass and counted as
    /// malformed; processing continues with the rest of the sequence.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.gas_target() == 0 {
            return Err(RecordError::UnusableGasLimit {
                number: self.number,
                gas_limit: self.gas_limit,
            });
        }
        if self.transaction_count as usize != self.transactions.len() {
            return Err(RecordError::TransactionCountMismatch {
                number: self.number,
                declared: self.transaction_count,
                actual: self.transactions.len() as u64,
            });
        }
        Ok(())
    }
}

/// Reasons a raw block record is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The gas limit is too small to derive a non-zero gas target.
    #[error("block {number} has unusable gas limit {gas_limit}")]
    UnusableGasLimit {
        /// The offending block number.
        number: u64,
        /// The declared gas limit.
        gas_limit: u64,
    },
    /// The declared transaction count disagrees with the decoded transactions.
    #[error("block {number} declares {declared} transactions but carries {actual}")]
    TransactionCountMismatch {
        /// The offending block number.
        number: u64,
        /// The declared transaction count.
        declared: u64,
        /// The number of decoded transactions.
        actual: u64,
    },
}
