//! Discrete congestion classification of block fullness.

/// A discrete congestion bucket over the 0-2 fullness-ratio scale.
///
/// Thresholds are inclusive on the lower bound and exclusive on the upper:
/// `Empty [0, 0.1)`, `Low [0.1, 0.8)`, `Medium [0.8, 1.2)`, `High [1.2, 1.8)`,
/// `Full [1.8, 2.0]`. Ratios above 2.0 clamp to `Full`; the derivation pass
/// counts those as data-quality anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CongestionBucket {
    /// Fullness below 0.1.
    #[display("empty")]
    Empty,
    /// Fullness in [0.1, 0.8).
    #[display("low")]
    Low,
    /// Fullness in [0.8, 1.2).
    #[display("medium")]
    Medium,
    /// Fullness in [1.2, 1.8).
    #[display("high")]
    High,
    /// Fullness of 1.8 and above.
    #[display("full")]
    Full,
}

impl CongestionBucket {
    /// All buckets, in ascending fullness order.
    pub const fn all() -> [Self; 5] {
        [Self::Empty, Self::Low, Self::Medium, Self::High, Self::Full]
    }

    /// Maps a fullness ratio to its bucket. Total and deterministic: every
    /// finite non-negative ratio lands in exactly one bucket.
    pub fn from_fullness(ratio: f64) -> Self {
        if ratio < 0.1 {
            Self::Empty
        } else if ratio < 0.8 {
            Self::Low
        } else if ratio < 1.2 {
            Self::Medium
        } else if ratio < 1.8 {
            Self::High
        } else {
            Self::Full
        }
    }

}
