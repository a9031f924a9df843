//! Scan orchestration.
//!
//! [`ScanOrchestrator`] ties the pieces together for one [`ScanOptions`]:
//!
//! 1. **Direct execution** ([`perform`](ScanOrchestrator::perform)): run
//!    `<command> -version` as a best-effort diagnostic, resolve every
//!    rulepack, assemble the argument vector, log it, and execute it.
//! 2. **Deferred rendering** ([`render`](ScanOrchestrator::render)): resolve
//!    and assemble the same vector, log it, and return it as a shell command
//!    string for another host or channel to run.
//!
//! The vector is `command`, the base arguments, one `-rules <path>` pair per
//! rulepack that resolved, then the scan arguments. Rulepacks that fail to
//! resolve are left out entirely.
//!
//! The workspace of the [`ScanOptions`] is the base for rulepack resolution
//! (relative references and downloads) and the working directory of both
//! processes. Resolved paths are absolute, so a rule accepted here is found
//! by the scanner too.

use crate::args::{self, append};
use crate::executor::ProcessExecutor;
use crate::logger::ConsoleLogger;
use crate::options::ScanOptions;
use crate::report::{CommandVector, RenderedCommand, RunReport};
use crate::resolver::RulepackResolver;
use std::time::Instant;

/// Flag placed before each resolved rulepack path.
///
/// The path goes through the same naive quoting as every other value: a
/// path containing a space becomes one argv token wrapped in literal `"`
/// characters. That suits the rendered shell command, but a directly
/// executed scanner receives the quotes as part of the path. Keep the temp
/// root and workspace free of spaces when running scans directly.
pub const RULES_FLAG: &str = "-rules";

/// Runs or renders scans described by [`ScanOptions`].
pub struct ScanOrchestrator {
    logger: ConsoleLogger,
    resolver: RulepackResolver,
}

impl ScanOrchestrator {
    /// Creates an orchestrator with a default [`RulepackResolver`].
    pub fn new(logger: ConsoleLogger) -> Self {
        let resolver = RulepackResolver::new(logger.clone());
        ScanOrchestrator { logger, resolver }
    }

    /// Replaces the resolver, e.g. one with a custom temp directory.
    pub fn with_resolver(mut self, resolver: RulepackResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Executes the scan and reports its outcome.
    ///
    /// Never fails; spawn errors and non-zero exits show up as
    /// `succeeded == false` in the returned [`RunReport`].
    pub fn perform(&self, options: &ScanOptions) -> RunReport {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        let executor = self.executor(options);

        let version = vec![options.command().to_string(), "-version".to_string()];
        let diagnostic = executor.execute(&version, options.env_vars());
        tracing::debug!(exit_code = diagnostic.exit_code, "version diagnostic finished");

        let (command, unresolved_rules) = self.command_vector(options);
        self.logger
            .log(&format!("Executing command: {command}"));

        let result = executor.execute(command.tokens(), options.env_vars());
        if !result.succeeded {
            self.logger.log(&format!(
                "ERROR: Scan failed with exit code {}",
                result.exit_code
            ));
        }

        RunReport {
            command,
            unresolved_rules,
            exit_code: result.exit_code,
            succeeded: result.succeeded,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Resolves and assembles the scan without running it, returning the
    /// command wrapped for the host shell.
    pub fn render(&self, options: &ScanOptions) -> RenderedCommand {
        let (argv, _) = self.command_vector(options);
        self.logger.log(&format!("Scan command: {argv}"));
        let shell = args::render_shell_command(argv.tokens());
        RenderedCommand { argv, shell }
    }

    /// Resolves the rulepacks and builds the full argument vector.
    ///
    /// Returns the vector together with the references that did not resolve.
    pub fn command_vector(&self, options: &ScanOptions) -> (CommandVector, Vec<String>) {
        let mut tokens = vec![options.command().to_string()];
        tokens.extend(options.base_args().iter().cloned());

        let mut unresolved = Vec::new();
        for reference in options.rules() {
            match self.resolver.resolve_in(reference, options.workspace()) {
                Some(path) => append(&mut tokens, path.to_string_lossy().into_owned(), RULES_FLAG),
                None => unresolved.push(reference.clone()),
            }
        }

        tokens.extend(options.scan_args().iter().cloned());
        (CommandVector::new(tokens), unresolved)
    }

    fn executor(&self, options: &ScanOptions) -> ProcessExecutor {
        let executor = ProcessExecutor::new(self.logger.clone());
        match options.workspace() {
            Some(dir) if dir.is_dir() => executor.current_dir(dir),
            _ => executor,
        }
    }
}
