#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod block;
pub use block::{BlockRecord, RecordError, TxRecord};

mod basefee;
pub use basefee::{
    BASE_FEE_MAX_CHANGE_DENOMINATOR, ELASTICITY_MULTIPLIER, FeeDirection, classify_direction,
    next_base_fee,
};

mod congestion;
pub use congestion::CongestionBucket;

mod derive;
pub use derive::{AnomalyCounters, BlockMetrics, Derivation, PriorityFeeSpan, derive};

mod summary;
pub use summary::{
    BucketRow, DirectionSplit, DistStats, FeeReport, GasTargetSplit, summarize,
};
