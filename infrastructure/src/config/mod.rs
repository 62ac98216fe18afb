//! Configuration file loading for extip-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `EXTIP_` environment variables (`EXTIP_QUORUM__RULE=3`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./extip.toml` or `./.extip.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/extip/config.toml`
//! 5. Fallback: `~/.config/extip/config.toml`
//! 6. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileHistoryConfig, FileOutputConfig, FilePeerSource, FilePeersConfig,
    FileQuorumConfig, FileStunConfig,
};
pub use loader::ConfigLoader;
