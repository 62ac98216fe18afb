//! Verdict value objects - immutable result types for a resolve run.
//!
//! - [`Decision`] - An address confirmed by a quorum of peers
//! - [`InconclusiveReport`] - Diagnostics when no address reached quorum
//! - [`Verdict`] - Either of the above

use super::tally::Tally;
use crate::core::error::PeerError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// An address that reached quorum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The winning address
    pub address: IpAddr,
    /// Quorum that was required
    pub quorum: usize,
    /// Peers that reported the winning address, in arrival order
    pub confirmed_by: Vec<String>,
    /// Outcomes observed before the decision (including the deciding one)
    pub responses_seen: usize,
    /// Number of peers launched
    pub peer_count: usize,
}

impl Decision {
    /// Peers that had not reported when the decision was made
    pub fn outstanding(&self) -> usize {
        self.peer_count.saturating_sub(self.responses_seen)
    }
}

/// Diagnostics for a run where no address reached quorum
///
/// Every launched peer appears exactly once, either in `failures` or in
/// `reported`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconclusiveReport {
    /// Quorum that was not met
    pub quorum: usize,
    /// Number of peers launched
    pub peer_count: usize,
    /// Failure reason per peer
    pub failures: BTreeMap<String, PeerError>,
    /// Address reported by peers whose answer never reached quorum
    pub reported: BTreeMap<String, IpAddr>,
}

impl InconclusiveReport {
    /// Creates an empty report for a run of `peer_count` peers.
    pub fn new(quorum: usize, peer_count: usize) -> Self {
        Self {
            quorum,
            peer_count,
            failures: BTreeMap::new(),
            reported: BTreeMap::new(),
        }
    }

    pub fn record_failure(&mut self, peer: impl Into<String>, error: PeerError) {
        self.failures.insert(peer.into(), error);
    }

    pub fn record_address(&mut self, peer: impl Into<String>, address: IpAddr) {
        self.reported.insert(peer.into(), address);
    }

    /// Count of reported addresses, highest first
    pub fn tally(&self) -> Tally {
        self.reported.values().copied().collect()
    }

    /// Combined number of failure and address entries
    pub fn entry_count(&self) -> usize {
        self.failures.len() + self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Whether every peer failed (no address was reported at all)
    pub fn all_failed(&self) -> bool {
        self.reported.is_empty() && !self.failures.is_empty()
    }
}

impl std::fmt::Display for InconclusiveReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no address reached quorum {} ({} peers: {} reported, {} failed)",
            self.quorum,
            self.peer_count,
            self.reported.len(),
            self.failures.len()
        )
    }
}

/// Final result of a resolve run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    Decided(Decision),
    Inconclusive(InconclusiveReport),
}

impl Verdict {
    /// The winning address, if the run was decided
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Verdict::Decided(decision) => Some(decision.address),
            Verdict::Inconclusive(_) => None,
        }
    }

    pub fn is_decided(&self) -> bool {
        matches!(self, Verdict::Decided(_))
    }

    pub fn quorum(&self) -> usize {
        match self {
            Verdict::Decided(decision) => decision.quorum,
            Verdict::Inconclusive(report) => report.quorum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_report_entries_and_tally() {
        let mut report = InconclusiveReport::new(3, 5);
        report.record_address("A", ip("1.2.3.4"));
        report.record_address("B", ip("5.6.7.8"));
        report.record_address("C", ip("1.2.3.4"));
        report.record_failure("D", PeerError::TimedOut);
        report.record_address("E", ip("9.9.9.9"));

        assert_eq!(report.entry_count(), 5);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.reported.len(), 4);
        assert!(!report.all_failed());

        let tally = report.tally();
        assert_eq!(tally.count(&ip("1.2.3.4")), 2);
        assert_eq!(tally.count(&ip("5.6.7.8")), 1);
        assert_eq!(tally.count(&ip("9.9.9.9")), 1);
    }

    #[test]
    fn test_report_display() {
        let mut report = InconclusiveReport::new(2, 2);
        report.record_failure("A", PeerError::Cancelled);
        report.record_failure("B", PeerError::TimedOut);
        assert!(report.all_failed());
        assert_eq!(
            report.to_string(),
            "no address reached quorum 2 (2 peers: 0 reported, 2 failed)"
        );
    }

    #[test]
    fn test_decision_outstanding() {
        let decision = Decision {
            address: ip("1.2.3.4"),
            quorum: 2,
            confirmed_by: vec!["A".to_string(), "C".to_string()],
            responses_seen: 3,
            peer_count: 5,
        };
        assert_eq!(decision.outstanding(), 2);

        let verdict = Verdict::Decided(decision);
        assert!(verdict.is_decided());
        assert_eq!(verdict.address(), Some(ip("1.2.3.4")));
        assert_eq!(verdict.quorum(), 2);
    }

    #[test]
    fn test_verdict_json_tag() {
        let verdict = Verdict::Inconclusive(InconclusiveReport::new(2, 3));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "inconclusive");
        assert_eq!(json["quorum"], 2);
        assert!(verdict.address().is_none());
    }
}
