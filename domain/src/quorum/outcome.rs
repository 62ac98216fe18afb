//! Outcome of a single peer query

use crate::core::error::PeerError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Result of querying one peer
///
/// Exactly one outcome is produced per peer launched in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PeerOutcome {
    /// The peer reported an address
    Success { peer: String, address: IpAddr },
    /// The peer could not be queried or its reply was unusable
    Failure { peer: String, error: PeerError },
}

impl PeerOutcome {
    pub fn success(peer: impl Into<String>, address: IpAddr) -> Self {
        Self::Success {
            peer: peer.into(),
            address,
        }
    }

    pub fn failure(peer: impl Into<String>, error: PeerError) -> Self {
        Self::Failure {
            peer: peer.into(),
            error,
        }
    }

    /// Build an outcome from a query result
    pub fn from_result(peer: impl Into<String>, result: Result<IpAddr, PeerError>) -> Self {
        match result {
            Ok(address) => Self::success(peer, address),
            Err(error) => Self::failure(peer, error),
        }
    }

    /// The peer this outcome belongs to
    pub fn peer(&self) -> &str {
        match self {
            PeerOutcome::Success { peer, .. } | PeerOutcome::Failure { peer, .. } => peer,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PeerOutcome::Success { .. })
    }

    /// The reported address, if any
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            PeerOutcome::Success { address, .. } => Some(*address),
            PeerOutcome::Failure { .. } => None,
        }
    }
}
