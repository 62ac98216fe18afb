//! Quorum domain
//!
//! This module contains the concepts used to decide an address by agreement.
//!
//! # Core Concepts
//!
//! ## Quorum Rule
//! How many peers must agree, expressed relative to the peer count
//! (majority, unanimous, percentage) or as an absolute count.
//!
//! ## Tally
//! Running count of identical answers. An address wins the moment its count
//! reaches the threshold, so the winner depends on arrival order.
//!
//! # Flow
//!
//! ```text
//! PeerOutcome ──┬── Failure ──────────────────────────► failures
//!               └── Success ──► Tally::record ──┬── count >= quorum ──► Decided
//!                                               └── otherwise ────────► reported
//!
//! all outcomes seen, nobody decided ──► Inconclusive(failures, reported, quorum)
//! ```

pub mod outcome;
pub mod rule;
pub mod tally;
pub mod verdict;

// Re-export main types
pub use outcome::PeerOutcome;
pub use rule::{QuorumRule, QuorumThreshold};
pub use tally::Tally;
pub use verdict::{InconclusiveReport, Verdict};
