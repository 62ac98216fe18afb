//! Quorum configuration from TOML (`[quorum]` section)
//!
//! Controls how many peers must agree and over which address family.
//!
//! ```toml
//! [quorum]
//! rule = "2"            # or "majority", "unanimous", "atleast:3", "75%"
//! family = "ipv4"       # or "ipv6"
//! timeout_secs = 5      # whole-run deadline, 0 disables it
//! ```

use extip_domain::{AddressFamily, ConfigIssue, ConfigIssueCode, QuorumRule};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw quorum configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuorumConfig {
    /// Agreement rule: "N", "majority", "unanimous", "atleast:N", "N%"
    pub rule: String,
    /// Address family to query: "ipv4" or "ipv6"
    pub family: String,
    /// Deadline for the whole run in seconds (0 = none)
    pub timeout_secs: u64,
}

impl Default for FileQuorumConfig {
    fn default() -> Self {
        Self {
            rule: "2".to_string(),
            family: "ipv4".to_string(),
            timeout_secs: 5,
        }
    }
}

impl FileQuorumConfig {
    /// Parse the rule string, falling back to the default rule on error
    pub fn parse_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.rule.parse::<QuorumRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: "quorum.rule".to_string(),
                        value: self.rule.clone(),
                    },
                    format!(
                        "quorum.rule: unknown value '{}' (expected N, majority, unanimous, atleast:N or N%)",
                        self.rule
                    ),
                );
                (QuorumRule::default(), vec![issue])
            }
        }
    }

    /// Parse the family string, falling back to IPv4 on error
    pub fn parse_family(&self) -> (AddressFamily, Vec<ConfigIssue>) {
        match self.family.parse::<AddressFamily>() {
            Ok(family) => (family, vec![]),
            Err(_) => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidValue {
                        field: "quorum.family".to_string(),
                        value: self.family.clone(),
                    },
                    format!(
                        "quorum.family: unknown value '{}' (expected ipv4 or ipv6)",
                        self.family
                    ),
                );
                (AddressFamily::default(), vec![issue])
            }
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
