//! Output formatting for CLI results.
//!
//! | Format | Module | Use case |
//! |--------|--------|----------|
//! | [`Pretty`](OutputFormat::Pretty) | [`pretty`] | Terminal / human review |
//! | [`Json`](OutputFormat::Json)     | [`json`]   | Automation / scripting  |
//!
//! Console output of the scan itself goes through the
//! [`ConsoleLogger`](crate::logger::ConsoleLogger); these formatters only
//! render the final summary.

pub mod json;
pub mod pretty;

use crate::report::{RenderedCommand, ResolvedRulepack, RunReport};

/// Supported output formats.
#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

/// Formats a [`RunReport`] in the requested [`OutputFormat`].
///
/// # Examples
///
/// ```rust,no_run
/// use cloudscan_runner::output::{format_run, OutputFormat};
/// # use cloudscan_runner::report::RunReport;
/// # fn example(report: &RunReport) {
/// let json = format_run(report, &OutputFormat::Json);
/// println!("{json}");
/// # }
/// ```
pub fn format_run(report: &RunReport, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::run(report),
        OutputFormat::Json => json::to_json(report),
    }
}

/// Formats a [`RenderedCommand`]. The pretty form is the bare shell string.
pub fn format_render(rendered: &RenderedCommand, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format!("{}\n", rendered.shell),
        OutputFormat::Json => json::to_json(rendered),
    }
}

/// Formats the outcome of resolving a list of rulepack references.
pub fn format_resolved(resolved: &[ResolvedRulepack], format: &OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::resolved(resolved),
        OutputFormat::Json => json::to_json(resolved),
    }
}
