//! Human-readable terminal output with colored status.

use crate::report::{ResolvedRulepack, RunReport};
use colored::Colorize;

/// Renders a [`RunReport`] as a short status block.
pub fn run(report: &RunReport) -> String {
    let mut out = String::new();
    let status = if report.succeeded {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };

    out.push('\n');
    out.push_str(&format!("  Scan {status}  (exit code {})\n", report.exit_code));
    out.push_str(&format!("  {:<10} {}\n", "Command:".dimmed(), report.command));
    out.push_str(&format!("  {:<10} {}\n", "Started:".dimmed(), report.started_at));
    out.push_str(&format!(
        "  {:<10} {} ms\n",
        "Duration:".dimmed(),
        report.duration_ms
    ));

    if !report.unresolved_rules.is_empty() {
        out.push_str(&format!(
            "  {} {} rulepack(s) could not be resolved:\n",
            "⚠".yellow(),
            report.unresolved_rules.len()
        ));
        for reference in &report.unresolved_rules {
            out.push_str(&format!("      {reference}\n"));
        }
    }

    out
}

/// Renders resolution outcomes one per line.
pub fn resolved(resolved: &[ResolvedRulepack]) -> String {
    let mut out = String::new();
    for item in resolved {
        match &item.path {
            Some(path) => out.push_str(&format!(
                "  {}  {} -> {}\n",
                "✓".green(),
                item.reference,
                path.display()
            )),
            None => out.push_str(&format!(
                "  {}  {} {}\n",
                "✗".red(),
                item.reference,
                "(unresolved)".red()
            )),
        }
    }
    out
}
