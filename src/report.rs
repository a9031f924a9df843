//! Result types produced by the orchestrator and the resolver front end.

use crate::args;
use std::fmt;
use std::path::PathBuf;

/// The literal argv of one scan, executable first.
///
/// Built once by the orchestrator and consumed either by execution or by
/// shell rendering; it is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct CommandVector(Vec<String>);

impl CommandVector {
    pub fn new(tokens: Vec<String>) -> Self {
        CommandVector(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// The executable, if the vector is not empty.
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Renders the vector for the host shell, e.g. `sh -c '...'`.
    pub fn to_shell_command(&self) -> String {
        args::render_shell_command(&self.0)
    }
}

impl fmt::Display for CommandVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&args::join(&self.0))
    }
}

/// Outcome of one direct scan execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunReport {
    pub command: CommandVector,
    /// Rulepack references that could not be resolved and were left out.
    pub unresolved_rules: Vec<String>,
    pub exit_code: i32,
    pub succeeded: bool,
    pub started_at: String,
    pub duration_ms: u64,
}

/// A scan command rendered for deferred execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RenderedCommand {
    pub argv: CommandVector,
    pub shell: String,
}

/// Resolution outcome of one rulepack reference.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedRulepack {
    pub reference: String,
    pub path: Option<PathBuf>,
}
