//! Progress notification port
//!
//! Defines the interface for reporting progress during a resolve run.

use extip_domain::{PeerOutcome, Verdict};

/// Callback for progress updates during a resolve run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bar, plain lines, etc.)
pub trait ResolveProgress: Send + Sync {
    /// Called once all peers have been launched
    fn on_run_start(&self, peer_count: usize, quorum: usize);

    /// Called for every outcome consumed by the resolver, in arrival order
    fn on_peer_complete(&self, outcome: &PeerOutcome);

    /// Called when the run ends with a verdict
    fn on_run_complete(&self, verdict: &Verdict);

    /// Called when the run is aborted by cancellation or deadline
    fn on_run_aborted(&self, _reason: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ResolveProgress for NoProgress {
    fn on_run_start(&self, _peer_count: usize, _quorum: usize) {}
    fn on_peer_complete(&self, _outcome: &PeerOutcome) {}
    fn on_run_complete(&self, _verdict: &Verdict) {}
}
