//! Console output formatter for resolve verdicts

use colored::Colorize;
use extip_domain::{Decision, InconclusiveReport, OutputFormat, Verdict};

/// Formats verdicts for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a verdict in the requested format
    pub fn render(verdict: &Verdict, format: OutputFormat) -> String {
        match format {
            OutputFormat::Address => Self::format_address(verdict),
            OutputFormat::Full => Self::format(verdict),
            OutputFormat::Json => Self::format_json(verdict),
        }
    }

    /// Only the agreed address, or a one-line explanation
    ///
    /// The decided form carries no decoration so it can be captured by scripts.
    pub fn format_address(verdict: &Verdict) -> String {
        match verdict {
            Verdict::Decided(decision) => decision.address.to_string(),
            Verdict::Inconclusive(report) => format!("{} {}", "inconclusive:".red().bold(), report),
        }
    }

    /// Format the complete verdict
    pub fn format(verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Public Address"));
        output.push('\n');

        match verdict {
            Verdict::Decided(decision) => Self::push_decision(&mut output, decision),
            Verdict::Inconclusive(report) => Self::push_report(&mut output, report),
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(verdict: &Verdict) -> String {
        serde_json::to_string_pretty(verdict).unwrap_or_else(|_| "{}".to_string())
    }

    fn push_decision(output: &mut String, decision: &Decision) {
        output.push_str(&format!(
            "\n{} {}\n",
            "Address:".cyan().bold(),
            decision.address.to_string().green().bold()
        ));
        output.push_str(&format!(
            "{} {} of {} peers\n",
            "Quorum:".cyan().bold(),
            decision.quorum,
            decision.peer_count
        ));

        output.push_str(&Self::section_header("Confirmed by"));
        for peer in &decision.confirmed_by {
            output.push_str(&format!("  {} {}\n", "v".green(), peer));
        }

        output.push_str(&format!(
            "\n{} {} responses consumed, {} still pending when decided\n",
            "Seen:".dimmed(),
            decision.responses_seen,
            decision.outstanding()
        ));
    }

    fn push_report(output: &mut String, report: &InconclusiveReport) {
        output.push_str(&format!(
            "\n{} {}\n",
            "Inconclusive:".red().bold(),
            report
        ));

        let tally = report.tally();
        if !tally.is_empty() {
            output.push_str(&Self::section_header("Tally"));
            for (address, count) in tally.iter() {
                let bar = "#".repeat(count);
                output.push_str(&format!(
                    "  {:<40} {} {}/{}\n",
                    address.to_string(),
                    bar.yellow(),
                    count,
                    report.quorum
                ));
            }
        }

        if !report.reported.is_empty() {
            output.push_str(&Self::section_header("Reported"));
            for (peer, address) in &report.reported {
                output.push_str(&format!("  {} {} -> {}\n", "?".yellow(), peer, address));
            }
        }

        if !report.failures.is_empty() {
            output.push_str(&Self::section_header("Failed"));
            for (peer, error) in &report.failures {
                output.push_str(&format!("  {} {}: {}\n", "x".red(), peer, error));
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
