//! Run history configuration from TOML (`[history]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw run history configuration
///
/// When `path` is set every run is appended to that file as JSONL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistoryConfig {
    pub path: Option<PathBuf>,
}
