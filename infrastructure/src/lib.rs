//! Infrastructure layer for extip-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod stun;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileHistoryConfig, FileOutputConfig, FilePeerSource,
    FilePeersConfig, FileQuorumConfig, FileStunConfig,
};
pub use logging::JsonlRunLogger;
pub use stun::{client::StunPeerQuery, error::StunError};
