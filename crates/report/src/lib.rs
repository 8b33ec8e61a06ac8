#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod format;
pub use format::{eth, eth_signed, fmt_eth, fmt_gwei, gwei};

mod table;
pub use table::{
    anomaly_table, congestion_table, direction_table, economics_table, summary_table,
};
