//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for resolve results
///
/// This is a domain concept representing how the verdict should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Only the winning address (default)
    #[default]
    Address,
    /// Per-peer breakdown with tally
    Full,
    /// JSON output
    Json,
}
