//! Immutable description of one scan invocation.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything needed to build and run one scan.
///
/// Built once through [`ScanOptions::builder`] and never mutated afterwards.
/// The command is guaranteed to be non-blank; every list may be empty.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ScanOptions {
    command: String,
    base_args: Vec<String>,
    rules: Vec<String>,
    scan_args: Vec<String>,
    env_vars: BTreeMap<String, String>,
    workspace: Option<PathBuf>,
}

impl ScanOptions {
    /// Starts building options for `command` (a path or a bare name on `PATH`).
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudscan_runner::options::ScanOptions;
    ///
    /// let options = ScanOptions::builder("echo").scan_arg("hello").build().unwrap();
    /// assert_eq!(options.command(), "echo");
    /// assert!(options.rules().is_empty());
    /// ```
    pub fn builder(command: impl Into<String>) -> ScanOptionsBuilder {
        ScanOptionsBuilder {
            command: command.into(),
            base_args: Vec::new(),
            rules: Vec::new(),
            scan_args: Vec::new(),
            env_vars: BTreeMap::new(),
            workspace: None,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments placed immediately after the command.
    pub fn base_args(&self) -> &[String] {
        &self.base_args
    }

    /// Rulepack references, in order, duplicates preserved.
    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    /// Arguments placed after the resolved `-rules` pairs.
    pub fn scan_args(&self) -> &[String] {
        &self.scan_args
    }

    /// Variables overlaid on the inherited environment of the scan process.
    pub fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env_vars
    }

    /// Base directory for rulepack resolution and working directory of the
    /// scan, when set.
    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_deref()
    }
}

/// Builder for [`ScanOptions`].
#[derive(Debug, Clone)]
pub struct ScanOptionsBuilder {
    command: String,
    base_args: Vec<String>,
    rules: Vec<String>,
    scan_args: Vec<String>,
    env_vars: BTreeMap<String, String>,
    workspace: Option<PathBuf>,
}

impl ScanOptionsBuilder {
    pub fn base_arg(mut self, arg: impl Into<String>) -> Self {
        self.base_args.push(arg.into());
        self
    }

    pub fn base_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn rule(mut self, reference: impl Into<String>) -> Self {
        self.rules.push(reference.into());
        self
    }

    pub fn rules<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules.extend(references.into_iter().map(Into::into));
        self
    }

    pub fn scan_arg(mut self, arg: impl Into<String>) -> Self {
        self.scan_args.push(arg.into());
        self
    }

    pub fn scan_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scan_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets one environment variable; a later call for the same name wins.
    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(name.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the working directory. An empty path clears it.
    pub fn workspace(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.workspace = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir)
        };
        self
    }

    /// Finishes the options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the command is blank.
    pub fn build(self) -> Result<ScanOptions, ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "scan command must not be empty".to_string(),
            ));
        }
        Ok(ScanOptions {
            command: self.command,
            base_args: self.base_args,
            rules: self.rules,
            scan_args: self.scan_args,
            env_vars: self.env_vars,
            workspace: self.workspace,
        })
    }
}
