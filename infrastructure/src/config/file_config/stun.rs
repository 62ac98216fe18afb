//! STUN client configuration from TOML (`[stun]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw STUN client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStunConfig {
    /// How long to wait for each peer's reply (0 = until the run ends)
    pub response_timeout_ms: u64,
}

impl Default for FileStunConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: 3000,
        }
    }
}

impl FileStunConfig {
    pub fn response_timeout(&self) -> Option<Duration> {
        (self.response_timeout_ms > 0).then(|| Duration::from_millis(self.response_timeout_ms))
    }
}
