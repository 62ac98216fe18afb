//! Domain layer for extip-quorum
//!
//! This crate contains the value objects used to decide the public address
//! of the local host. It has no dependencies on networking, configuration
//! files or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Peers
//!
//! A **peer** is one independent address-identification service (a STUN
//! server). A [`PeerSet`] is the ordered list of peers contacted in one run.
//!
//! ## Quorum
//!
//! An address is trusted only after `quorum` peers independently report it.
//! The [`QuorumRule`] resolves to a concrete [`QuorumThreshold`] for a given
//! peer count; the [`Tally`] counts agreement as outcomes arrive.
//!
//! ## Verdict
//!
//! A run ends with a [`Verdict`]: either a [`Decision`] (an address reached
//! quorum) or an [`InconclusiveReport`] (every peer answered, none agreed
//! often enough).

pub mod config;
pub mod core;
pub mod quorum;

// Re-export commonly used types
pub use config::{
    output_format::OutputFormat,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use core::{
    error::{DomainError, PeerError},
    family::AddressFamily,
    peer::{PeerSelection, PeerSet, WELL_KNOWN_PEERS},
};
pub use quorum::{
    InconclusiveReport, PeerOutcome, QuorumRule, QuorumThreshold, Tally, Verdict,
    verdict::Decision,
};
