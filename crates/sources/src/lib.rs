#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod config;
pub use config::SourceConfig;

mod errors;
pub use errors::{SourceError, SourceResult};

mod rpc;
pub use rpc::RpcBlockSource;

mod store;
pub use store::BlockStore;
