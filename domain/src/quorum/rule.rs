//! Quorum rules for agreement determination
//!
//! This module defines how many agreeing peers are needed before an address
//! is trusted.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Rule for determining the quorum of a run
///
/// - `AtLeast(n)`: At least n peers must agree (default: 2)
/// - `Majority`: More than half of the peers must agree
/// - `Unanimous`: Every peer must agree (strictest)
/// - `Percentage(p)`: At least p% of the peers must agree
///
/// # Example
///
/// ```
/// use extip_domain::QuorumRule;
///
/// let rule = QuorumRule::Majority;
/// assert_eq!(rule.required(5), 3);
///
/// let threshold = QuorumRule::AtLeast(2).threshold(7).unwrap();
/// assert_eq!(threshold.get(), 2);
///
/// assert!(QuorumRule::AtLeast(8).threshold(7).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// More than half must agree (n/2 + 1)
    Majority,

    /// All peers must agree
    Unanimous,

    /// At least n peers must agree
    AtLeast(usize),

    /// At least this percentage must agree (0-100)
    Percentage(u8),
}

impl Default for QuorumRule {
    fn default() -> Self {
        QuorumRule::AtLeast(2)
    }
}

impl QuorumRule {
    /// Number of agreeing peers this rule asks for, given the peer count
    pub fn required(&self, peer_count: usize) -> usize {
        match self {
            QuorumRule::Majority => peer_count / 2 + 1,
            QuorumRule::Unanimous => peer_count,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => {
                (peer_count as f64 * (*p as f64 / 100.0)).ceil() as usize
            }
        }
    }

    /// Resolve this rule into a concrete threshold for `peer_count` peers
    ///
    /// Fails when the resolved count is zero or exceeds the number of peers,
    /// since such a quorum can never be met meaningfully.
    pub fn threshold(&self, peer_count: usize) -> Result<QuorumThreshold, DomainError> {
        QuorumThreshold::new(self.required(peer_count), peer_count)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (all must agree)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} agreeing peers", n),
            QuorumRule::Percentage(p) => format!("at least {}% agreement", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidQuorumRule(s.to_string());

        match s.trim().to_lowercase().as_str() {
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or_else(invalid)?
                    .parse()
                    .map_err(|_| invalid())?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| invalid())?;
                if p > 100 {
                    return Err(invalid());
                }
                Ok(QuorumRule::Percentage(p))
            }
            s => s.parse().map(QuorumRule::AtLeast).map_err(|_| invalid()),
        }
    }
}

/// Validated quorum for one run
///
/// Invariant: `1 <= quorum <= peer_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumThreshold {
    quorum: usize,
}

impl QuorumThreshold {
    /// Validate `quorum` against the number of peers in the run
    pub fn new(quorum: usize, peer_count: usize) -> Result<Self, DomainError> {
        if peer_count == 0 {
            return Err(DomainError::EmptyPeerSet);
        }
        if quorum == 0 {
            return Err(DomainError::ZeroQuorum);
        }
        if quorum > peer_count {
            return Err(DomainError::QuorumUnreachable {
                quorum,
                peers: peer_count,
            });
        }
        Ok(Self { quorum })
    }

    pub fn get(&self) -> usize {
        self.quorum
    }

    /// Whether `count` agreeing peers satisfy this threshold
    pub fn is_reached(&self, count: usize) -> bool {
        count >= self.quorum
    }
}

impl std::fmt::Display for QuorumThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.quorum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_rule() {
        let rule = QuorumRule::Majority;
        assert_eq!(rule.required(3), 2);
        assert_eq!(rule.required(4), 3);
        assert_eq!(rule.required(7), 4);
    }

    #[test]
    fn test_unanimous_rule() {
        assert_eq!(QuorumRule::Unanimous.required(5), 5);
        assert_eq!(QuorumRule::Unanimous.required(1), 1);
    }

    #[test]
    fn test_percentage_rule() {
        let rule = QuorumRule::Percentage(75);
        // 4 peers: 75% = 3
        assert_eq!(rule.required(4), 3);
        // 5 peers: ceil(3.75) = 4
        assert_eq!(rule.required(5), 4);
    }

    #[test]
    fn test_threshold_bounds() {
        assert_eq!(QuorumRule::AtLeast(1).threshold(1).unwrap().get(), 1);
        assert_eq!(QuorumRule::AtLeast(5).threshold(5).unwrap().get(), 5);
        assert_eq!(
            QuorumRule::AtLeast(0).threshold(5),
            Err(DomainError::ZeroQuorum)
        );
        assert_eq!(
            QuorumRule::AtLeast(6).threshold(5),
            Err(DomainError::QuorumUnreachable {
                quorum: 6,
                peers: 5
            })
        );
        assert_eq!(
            QuorumRule::Majority.threshold(0),
            Err(DomainError::EmptyPeerSet)
        );
        assert_eq!(
            QuorumRule::Percentage(0).threshold(3),
            Err(DomainError::ZeroQuorum)
        );
    }

    #[test]
    fn test_is_reached() {
        let threshold = QuorumThreshold::new(2, 5).unwrap();
        assert!(!threshold.is_reached(1));
        assert!(threshold.is_reached(2));
        assert!(threshold.is_reached(3));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!("majority".parse::<QuorumRule>().ok(), Some(QuorumRule::Majority));
        assert_eq!("Unanimous".parse::<QuorumRule>().ok(), Some(QuorumRule::Unanimous));
        assert_eq!("atleast:2".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(2)));
        assert_eq!("at_least:3".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(3)));
        assert_eq!("4".parse::<QuorumRule>().ok(), Some(QuorumRule::AtLeast(4)));
        assert_eq!(
            "percentage:75".parse::<QuorumRule>().ok(),
            Some(QuorumRule::Percentage(75))
        );
        assert_eq!("80%".parse::<QuorumRule>().ok(), Some(QuorumRule::Percentage(80)));
        assert!("150%".parse::<QuorumRule>().is_err());
        assert!("most".parse::<QuorumRule>().is_err());
        assert!("-1".parse::<QuorumRule>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(QuorumRule::Majority.to_string(), "majority (more than half)");
        assert_eq!(QuorumRule::AtLeast(2).to_string(), "at least 2 agreeing peers");
    }

    #[test]
    fn test_default() {
        assert_eq!(QuorumRule::default(), QuorumRule::AtLeast(2));
    }
}
