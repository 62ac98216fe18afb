//! Peer list configuration from TOML (`[peers]` section)

use extip_domain::{ConfigIssue, ConfigIssueCode, PeerSelection};
use serde::{Deserialize, Serialize};

/// Where the peer list comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilePeerSource {
    /// Built-in list of public STUN servers
    #[default]
    WellKnown,
    /// Only the servers listed in `peers.servers`
    Explicit,
}

/// Raw peer configuration
///
/// ```toml
/// [peers]
/// source = "explicit"
/// servers = ["stun.l.google.com:19302", "stun.example.org"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePeersConfig {
    pub source: FilePeerSource,
    /// `host[:port]` entries, port defaults to 3478
    pub servers: Vec<String>,
}

impl FilePeersConfig {
    pub fn selection(&self) -> PeerSelection {
        match self.source {
            FilePeerSource::WellKnown => PeerSelection::WellKnown,
            FilePeerSource::Explicit => PeerSelection::Explicit(self.servers.clone()),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let blank = self.servers.iter().all(|s| s.trim().is_empty());
        match self.source {
            FilePeerSource::Explicit if blank => vec![ConfigIssue::error(
                ConfigIssueCode::EmptyExplicitPeers,
                "peers.source is \"explicit\" but peers.servers is empty",
            )],
            FilePeerSource::WellKnown if !blank => vec![ConfigIssue::warning(
                ConfigIssueCode::IgnoredServers,
                "peers.servers is ignored while peers.source is \"well-known\"",
            )],
            _ => vec![],
        }
    }
}
