//! Progress reporting for resolve runs
//!
//! Both reporters write to stderr so that stdout carries only the result.

use colored::Colorize;
use extip_application::ResolveProgress;
use extip_domain::{PeerOutcome, Verdict};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Reports progress with an indicatif bar, one tick per peer outcome
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
    draw_target: fn() -> ProgressDrawTarget,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            draw_target: ProgressDrawTarget::stderr,
        }
    }

    /// A reporter that keeps its bar off the terminal
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            draw_target: ProgressDrawTarget::hidden,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn outcome_message(outcome: &PeerOutcome) -> String {
        match outcome {
            PeerOutcome::Success { peer, address } => {
                format!("{} {} {}", "v".green(), peer, address)
            }
            PeerOutcome::Failure { peer, error } => {
                format!("{} {} ({})", "x".red(), peer, error.kind())
            }
        }
    }

    /// Position of the bar, if a run is in progress
    pub fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .ok()
            .and_then(|bar| bar.as_ref().map(ProgressBar::position))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolveProgress for ProgressReporter {
    fn on_run_start(&self, peer_count: usize, quorum: usize) {
        let pb = ProgressBar::with_draw_target(Some(peer_count as u64), (self.draw_target)());
        pb.set_style(Self::style());
        pb.set_prefix(format!("quorum {}", quorum));
        pb.set_message("querying peers...");

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_peer_complete(&self, outcome: &PeerOutcome) {
        if let Ok(bar) = self.bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(Self::outcome_message(outcome));
            pb.inc(1);
        }
    }

    fn on_run_complete(&self, verdict: &Verdict) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            let message = match verdict {
                Verdict::Decided(_) => "agreed".green().to_string(),
                Verdict::Inconclusive(_) => "no agreement".red().to_string(),
            };
            pb.finish_with_message(message);
        }
    }

    fn on_run_aborted(&self, reason: &str) {
        if let Ok(mut bar) = self.bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.abandon_with_message(format!("{} {}", "aborted:".red(), reason));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ResolveProgress for SimpleProgress {
    fn on_run_start(&self, peer_count: usize, quorum: usize) {
        eprintln!(
            "{} {} ({} peers, quorum {})",
            "->".cyan(),
            "Querying peers".bold(),
            peer_count,
            quorum
        );
    }

    fn on_peer_complete(&self, outcome: &PeerOutcome) {
        match outcome {
            PeerOutcome::Success { peer, address } => {
                eprintln!("  {} {} {}", "v".green(), peer, address)
            }
            PeerOutcome::Failure { peer, error } => {
                eprintln!("  {} {} ({})", "x".red(), peer, error)
            }
        }
    }

    fn on_run_complete(&self, _verdict: &Verdict) {
        eprintln!();
    }

    fn on_run_aborted(&self, reason: &str) {
        eprintln!("  {} {}", "aborted:".red(), reason);
    }
}
