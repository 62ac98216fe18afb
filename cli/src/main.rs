//! CLI entrypoint for extip
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use extip_application::{ResolveAddressUseCase, ResolveInput};
use extip_domain::{Severity, Verdict, WELL_KNOWN_PEERS};
use extip_infrastructure::{ConfigLoader, FileConfig, FilePeerSource, JsonlRunLogger, StunPeerQuery};
use extip_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when every peer answered but none agreed often enough
const EXIT_INCONCLUSIVE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.list_peers {
        for peer in WELL_KNOWN_PEERS {
            println!("{}", peer);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_overrides(&mut config, &cli);
    check_config(&config)?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let (rule, _) = config.quorum.parse_rule();
    let (family, _) = config.quorum.parse_family();
    let peers = config.peers.selection().resolve();

    info!(
        "Starting extip: {} peers, rule {}, {}",
        peers.len(),
        rule,
        family
    );

    let input = ResolveInput::new(peers, rule)
        .with_family(family)
        .with_deadline(config.quorum.deadline());

    let mut query = StunPeerQuery::new();
    if let Some(timeout) = config.stun.response_timeout() {
        query = query.with_response_timeout(timeout);
    }

    let mut use_case = ResolveAddressUseCase::new(Arc::new(query));
    if let Some(path) = &config.history.path {
        match JsonlRunLogger::new(path) {
            Some(logger) => use_case = use_case.with_logger(Arc::new(logger)),
            None => warn!("Run history disabled: cannot open {}", path.display()),
        }
    }

    // Ctrl-C cancels the run; in-flight queries are released by the resolver
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let verdict = if cli.quiet {
        use_case.execute(input, cancel).await?
    } else if std::io::stderr().is_terminal() {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, cancel, &progress).await?
    } else {
        use_case.execute_with_progress(input, cancel, &SimpleProgress).await?
    };

    let output = ConsoleFormatter::render(&verdict, config.output.format);
    match &verdict {
        Verdict::Decided(_) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Verdict::Inconclusive(_) => {
            // Keep stdout empty for scripts capturing a bare address
            if config.output.format == extip_domain::OutputFormat::Address {
                eprintln!("{}", output);
            } else {
                println!("{}", output);
            }
            Ok(ExitCode::from(EXIT_INCONCLUSIVE))
        }
    }
}

/// Command-line flags override every configuration source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.peer.is_empty() {
        config.peers.source = FilePeerSource::Explicit;
        config.peers.servers = cli.peer.clone();
    }
    if let Some(rule) = &cli.quorum {
        config.quorum.rule = rule.clone();
    }
    if cli.ipv6 {
        config.quorum.family = "ipv6".to_string();
    }
    if let Some(secs) = cli.timeout {
        config.quorum.timeout_secs = secs;
    }
    if let Some(format) = cli.output {
        config.output.format = format.into();
    }
    if let Some(path) = &cli.history {
        config.history.path = Some(path.clone());
    }
}

/// Log warnings and refuse to run on any configuration error
fn check_config(config: &FileConfig) -> Result<()> {
    let mut errors = Vec::new();
    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => errors.push(issue.message),
        }
    }
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}
