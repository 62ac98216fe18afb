//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
///
/// Every variant is a configuration error: it is detected before any peer
/// is contacted and is never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No peers configured")]
    EmptyPeerSet,

    #[error("Quorum must be at least 1")]
    ZeroQuorum,

    #[error("Quorum of {quorum} cannot be reached with {peers} peers")]
    QuorumUnreachable { quorum: usize, peers: usize },

    #[error("Invalid quorum rule: {0}")]
    InvalidQuorumRule(String),

    #[error("Invalid address family: {0}")]
    InvalidAddressFamily(String),
}

/// Reason a single peer did not produce an address
///
/// Per-peer failures never abort a run. They are collected and only
/// surfaced, in aggregate, when the run ends inconclusive.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PeerError {
    #[error("Resolve error: {0}")]
    Resolve(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed reply: {0}")]
    Malformed(String),

    #[error("Rejected by peer ({code}): {reason}")]
    Rejected { code: u16, reason: String },

    #[error("Timed out waiting for reply")]
    TimedOut,

    #[error("Query cancelled")]
    Cancelled,
}

impl PeerError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PeerError::Cancelled)
    }

    /// Short machine-friendly label for this failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            PeerError::Resolve(_) => "resolve",
            PeerError::Transport(_) => "transport",
            PeerError::Malformed(_) => "malformed",
            PeerError::Rejected { .. } => "rejected",
            PeerError::TimedOut => "timed_out",
            PeerError::Cancelled => "cancelled",
        }
    }
}

impl From<std::io::Error> for PeerError {
    fn from(e: std::io::Error) -> Self {
        PeerError::Transport(e.to_string())
    }
}
