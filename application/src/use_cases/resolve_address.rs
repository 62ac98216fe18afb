//! Resolve Address use case
//!
//! Asks every peer concurrently for our public address and decides the
//! answer by quorum, in the order the answers arrive.

use crate::ports::peer_query::PeerQuery;
use crate::ports::progress::{NoProgress, ResolveProgress};
use crate::ports::run_logger::{NoRunLogger, RunEvent, RunLogger};
use extip_domain::{
    AddressFamily, Decision, DomainError, InconclusiveReport, PeerError, PeerOutcome, PeerSet,
    QuorumRule, Tally, Verdict,
};
use futures::FutureExt;
use serde_json::json;
use std::collections::HashMap;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How long cancelled queries get to wind down before they are aborted
const CANCEL_GRACE: Duration = Duration::from_secs(1);

/// Errors that end a run without a verdict
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("No peers configured")]
    EmptyPeerSet,

    #[error("Quorum must be at least 1")]
    ZeroQuorum,

    #[error("Quorum of {quorum} cannot be reached with {peers} peers")]
    QuorumUnreachable { quorum: usize, peers: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Timed out after {0:?} without reaching quorum")]
    TimedOut(Duration),
}

impl ResolveError {
    /// Check if this error represents a cancellation by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveError::Cancelled)
    }

    /// Check if this error was raised before any peer was contacted
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ResolveError::EmptyPeerSet
                | ResolveError::ZeroQuorum
                | ResolveError::QuorumUnreachable { .. }
                | ResolveError::InvalidConfig(_)
        )
    }
}

impl From<DomainError> for ResolveError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::EmptyPeerSet => ResolveError::EmptyPeerSet,
            DomainError::ZeroQuorum => ResolveError::ZeroQuorum,
            DomainError::QuorumUnreachable { quorum, peers } => {
                ResolveError::QuorumUnreachable { quorum, peers }
            }
            other => ResolveError::InvalidConfig(other.to_string()),
        }
    }
}

/// Input for the ResolveAddress use case
#[derive(Debug, Clone)]
pub struct ResolveInput {
    /// Peers to contact
    pub peers: PeerSet,
    /// How many peers must agree
    pub quorum: QuorumRule,
    /// Address family used for every query in the run
    pub family: AddressFamily,
    /// Give up after this long without a verdict
    pub deadline: Option<Duration>,
}

impl ResolveInput {
    pub fn new(peers: PeerSet, quorum: QuorumRule) -> Self {
        Self {
            peers,
            quorum,
            family: AddressFamily::default(),
            deadline: None,
        }
    }

    pub fn with_family(mut self, family: AddressFamily) -> Self {
        self.family = family;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

type QueryResult = (String, Result<IpAddr, PeerError>);

/// Use case for resolving the public address by quorum
pub struct ResolveAddressUseCase<Q: PeerQuery + ?Sized + 'static> {
    query: Arc<Q>,
    logger: Arc<dyn RunLogger>,
}

impl<Q: PeerQuery + ?Sized + 'static> ResolveAddressUseCase<Q> {
    pub fn new(query: Arc<Q>) -> Self {
        Self {
            query,
            logger: Arc::new(NoRunLogger),
        }
    }

    /// Record run history through `logger`
    pub fn with_logger(mut self, logger: Arc<dyn RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ResolveInput,
        cancel: CancellationToken,
    ) -> Result<Verdict, ResolveError> {
        self.execute_with_progress(input, cancel, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    ///
    /// `cancel` belongs to the caller. Cancelling it aborts the run with
    /// [`ResolveError::Cancelled`]; the run never cancels it itself.
    pub async fn execute_with_progress(
        &self,
        input: ResolveInput,
        cancel: CancellationToken,
        progress: &dyn ResolveProgress,
    ) -> Result<Verdict, ResolveError> {
        if input.peers.is_empty() {
            return Err(ResolveError::EmptyPeerSet);
        }
        let peer_count = input.peers.len();
        let threshold = input.quorum.threshold(peer_count)?;
        let quorum = threshold.get();

        info!(
            "Resolving {} address from {} peers (quorum {})",
            input.family, peer_count, quorum
        );

        // Fires on every exit path, including this future being dropped
        let run_token = cancel.child_token();
        let _run_guard = run_token.clone().drop_guard();

        let mut join_set: JoinSet<QueryResult> = JoinSet::new();

        for peer in input.peers.iter() {
            let query = Arc::clone(&self.query);
            let peer = peer.to_string();
            let token = run_token.clone();
            let family = input.family;

            join_set.spawn(async move {
                // A panicking adapter still yields an outcome for its peer
                let result = AssertUnwindSafe(query.query(&peer, family, token))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        Err(PeerError::Transport("peer query panicked".to_string()))
                    });
                (peer, result)
            });
        }

        progress.on_run_start(peer_count, quorum);
        self.logger.log(RunEvent::new(
            "run_started",
            json!({
                "peers": input.peers.as_slice(),
                "quorum": quorum,
                "family": input.family.as_str(),
            }),
        ));

        let deadline = async {
            match input.deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut tally = Tally::new();
        let mut confirmations: HashMap<IpAddr, Vec<String>> = HashMap::new();
        let mut report = InconclusiveReport::new(quorum, peer_count);
        let mut seen = 0;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!("Run cancelled after {}/{} outcomes", seen, peer_count);
                    return Err(self.abort(run_token, join_set, ResolveError::Cancelled, progress));
                }
                _ = &mut deadline => {
                    let limit = input.deadline.unwrap_or_default();
                    warn!("Run timed out after {:?} ({}/{} outcomes)", limit, seen, peer_count);
                    return Err(self.abort(run_token, join_set, ResolveError::TimedOut(limit), progress));
                }
                joined = join_set.join_next() => joined,
            };

            let Some(joined) = joined else {
                break;
            };

            let outcome = match joined {
                Ok((peer, result)) => PeerOutcome::from_result(peer, result),
                Err(e) => {
                    // Tasks are only aborted after the loop ends
                    warn!("Task join error: {}", e);
                    continue;
                }
            };
            seen += 1;

            progress.on_peer_complete(&outcome);
            self.log_outcome(&outcome);

            match outcome {
                PeerOutcome::Failure { peer, error } => {
                    warn!("Peer {} failed: {}", peer, error);
                    report.record_failure(peer, error);
                }
                PeerOutcome::Success { peer, address } => {
                    let count = tally.record(address);
                    debug!("Peer {} reported {} ({}/{})", peer, address, count, quorum);
                    confirmations.entry(address).or_default().push(peer.clone());

                    if threshold.is_reached(count) {
                        let decision = Decision {
                            address,
                            quorum,
                            confirmed_by: confirmations.remove(&address).unwrap_or_default(),
                            responses_seen: seen,
                            peer_count,
                        };
                        info!(
                            "Quorum reached: {} confirmed by {} peers after {}/{} outcomes",
                            address, count, seen, peer_count
                        );
                        Self::release(run_token, join_set);

                        let verdict = Verdict::Decided(decision);
                        self.log_verdict(&verdict);
                        progress.on_run_complete(&verdict);
                        return Ok(verdict);
                    }

                    report.record_address(peer, address);
                }
            }
        }

        info!("No address reached quorum {}: {}", quorum, report);
        let verdict = Verdict::Inconclusive(report);
        self.log_verdict(&verdict);
        progress.on_run_complete(&verdict);
        Ok(verdict)
    }

    /// Stop a run that ended without a verdict
    fn abort(
        &self,
        run_token: CancellationToken,
        join_set: JoinSet<QueryResult>,
        error: ResolveError,
        progress: &dyn ResolveProgress,
    ) -> ResolveError {
        Self::release(run_token, join_set);
        progress.on_run_aborted(&error.to_string());
        self.logger.log(RunEvent::new(
            "run_aborted",
            json!({ "reason": error.to_string() }),
        ));
        error
    }

    /// Cancel the queries still in flight and reap them in the background
    ///
    /// Queries get [`CANCEL_GRACE`] to observe cancellation and return;
    /// whatever is left after that is aborted when the set is dropped.
    fn release(run_token: CancellationToken, mut join_set: JoinSet<QueryResult>) {
        run_token.cancel();
        if join_set.is_empty() {
            return;
        }

        let outstanding = join_set.len();
        debug!("Releasing {} in-flight queries", outstanding);
        tokio::spawn(async move {
            let drained = tokio::time::timeout(CANCEL_GRACE, async {
                while let Some(joined) = join_set.join_next().await {
                    if let Ok((peer, Ok(address))) = joined {
                        debug!("Late answer from {} ({}) discarded", peer, address);
                    }
                }
            })
            .await;
            if drained.is_err() {
                warn!(
                    "{} queries ignored cancellation; aborting them",
                    join_set.len()
                );
            }
        });
    }

    fn log_outcome(&self, outcome: &PeerOutcome) {
        let payload = serde_json::to_value(outcome).unwrap_or_else(|_| json!({}));
        self.logger.log(RunEvent::new("peer_outcome", payload));
    }

    fn log_verdict(&self, verdict: &Verdict) {
        let event_type = if verdict.is_decided() {
            "run_decided"
        } else {
            "run_inconclusive"
        };
        let payload = serde_json::to_value(verdict).unwrap_or_else(|_| json!({}));
        self.logger.log(RunEvent::new(event_type, payload));
    }
}
