//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod history;
mod output;
mod peers;
mod quorum;
mod stun;

pub use history::FileHistoryConfig;
pub use output::FileOutputConfig;
pub use peers::{FilePeerSource, FilePeersConfig};
pub use quorum::FileQuorumConfig;
pub use stun::FileStunConfig;

use extip_domain::{ConfigIssue, ConfigIssueCode, QuorumRule};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Agreement rule, address family and run deadline
    pub quorum: FileQuorumConfig,
    /// Peer list selection
    pub peers: FilePeersConfig,
    /// STUN client settings
    pub stun: FileStunConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// JSONL run history
    pub history: FileHistoryConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks that the rule and family parse, that the peer selection is
    /// usable, and that a fixed quorum does not exceed the peer count.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let (rule, rule_issues) = self.quorum.parse_rule();
        let rule_ok = rule_issues.is_empty();
        issues.extend(rule_issues);
        issues.extend(self.quorum.parse_family().1);
        issues.extend(self.peers.validate());

        // Only a fixed count can exceed the peers; relative rules scale with them
        if let (true, QuorumRule::AtLeast(quorum)) = (rule_ok, rule) {
            let peers = self.peers.selection().resolve().len();
            if peers > 0 && quorum > peers {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::QuorumUnreachable { quorum, peers },
                    format!(
                        "quorum.rule requires {} agreeing peers but only {} are configured",
                        quorum, peers
                    ),
                ));
            }
        }

        issues
    }
}
