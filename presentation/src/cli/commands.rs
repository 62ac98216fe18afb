//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for resolve results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the agreed address
    Address,
    /// Per-peer breakdown with tally
    Full,
    /// JSON output
    Json,
}

impl From<OutputFormat> for extip_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Address => extip_domain::OutputFormat::Address,
            OutputFormat::Full => extip_domain::OutputFormat::Full,
            OutputFormat::Json => extip_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for extip
#[derive(Parser, Debug)]
#[command(name = "extip")]
#[command(author, version, about = "Discover the public IP address by STUN quorum")]
#[command(long_about = r#"
extip asks several STUN servers which address they see this host connecting
from, and prints the first address reported by enough of them.

All peers are queried at once. As soon as one address has been reported by
QUORUM peers it is printed and the remaining queries are cancelled. If every
peer answers (or fails) without any address reaching the quorum, nothing is
trusted and the run ends inconclusive.

Configuration files are loaded from (in priority order):
1. EXTIP_* environment variables (e.g. EXTIP_QUORUM__RULE=majority)
2. --config <path>     Explicit config file
3. ./extip.toml        Project-level config
4. ~/.config/extip/config.toml   Global config

Exit status: 0 when an address was agreed, 2 when inconclusive, 1 on error.

Example:
  extip
  extip -q 3 -o full
  extip -6 -p stun.l.google.com:19302 -p stun.example.org -q 2
"#)]
pub struct Cli {
    /// Peers to query as host[:port] (repeatable, replaces the built-in list)
    #[arg(short, long, value_name = "HOST[:PORT]")]
    pub peer: Vec<String>,

    /// Agreement rule: N, majority, unanimous, atleast:N or N%
    #[arg(short, long, value_name = "RULE")]
    pub quorum: Option<String>,

    /// Discover the IPv6 address instead of IPv4
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Give up on the whole run after this many seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append a JSONL record of this run to PATH
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Print the built-in peer list and exit
    #[arg(long)]
    pub list_peers: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["extip"]).unwrap();
        assert!(cli.peer.is_empty());
        assert!(cli.quorum.is_none());
        assert!(!cli.ipv6);
        assert!(cli.output.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_repeatable_peers_and_flags() {
        let cli = Cli::try_parse_from([
            "extip", "-p", "a.example", "--peer", "b.example:19302", "-q", "majority", "-6",
            "-o", "json", "-vv", "--timeout", "3",
        ])
        .unwrap();
        assert_eq!(cli.peer, vec!["a.example", "b.example:19302"]);
        assert_eq!(cli.quorum.as_deref(), Some("majority"));
        assert!(cli.ipv6);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.timeout, Some(3));
    }

    #[test]
    fn test_unknown_output_is_rejected() {
        assert!(Cli::try_parse_from(["extip", "-o", "yaml"]).is_err());
    }

    #[test]
    fn test_output_format_maps_to_domain() {
        let format: extip_domain::OutputFormat = OutputFormat::Full.into();
        assert_eq!(format, extip_domain::OutputFormat::Full);
    }
}
