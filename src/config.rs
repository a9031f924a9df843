//! Job configuration loading.
//!
//! A job file describes one cloudscan invocation the way a build step would:
//! global tool settings, per-job scan settings, extra environment variables
//! and the rulepacks to apply. [`Config::to_scan_options`] turns it into a
//! [`ScanOptions`] value.
//!
//! # Configuration file
//!
//! The default configuration file is `cloudscan.toml` in the current working
//! directory. Use [`Config::load`] to read it:
//!
//! ```rust,no_run
//! use cloudscan_runner::config::Config;
//!
//! let config = Config::load(None).expect("failed to load config");
//! let options = config.to_scan_options().expect("invalid job");
//! println!("{}", options.command());
//! ```
//!
//! ```toml
//! workspace = "/var/builds/web"
//!
//! [tool]
//! exe_path = "/opt/fortify/bin/cloudscan"
//! controller_url = "https://cloudscan.example.com/cloud-ctrl"
//!
//! [job]
//! build_id = "web-${BUILD_NUMBER}"
//! xmx = "4G"
//! quick = true
//! rules = "https://rules.example.com/custom.zip, /opt/rules/extra.xml"
//!
//! [env]
//! JAVA_HOME = "/usr/lib/jvm/java-17"
//! ```

use crate::args::{append, append_concat, ArgValue};
use crate::error::ConfigError;
use crate::options::ScanOptions;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// File looked up in the current directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "cloudscan.toml";

/// Executable used when [`ToolConfig::exe_path`] is blank.
pub const DEFAULT_COMMAND: &str = "cloudscan";

/// Root of a job configuration file.
///
/// Every field carries a default so a partial file (or none at all) works.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Base for relative rulepacks and downloads; also the scan's working
    /// directory.
    pub workspace: String,
    /// Root for rulepack downloads instead of the system temp directory.
    pub temp_dir: Option<PathBuf>,
    pub tool: ToolConfig,
    pub job: JobConfig,
    /// Extra variables for the scan process; also visible to `${VAR}`
    /// substitution in job values.
    pub env: BTreeMap<String, String>,
}

/// Installation-wide tool settings. Read-only for a job.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Path to the cloudscan executable; `cloudscan` on `PATH` when blank.
    pub exe_path: String,
    /// CloudScan controller URL, used when SSC upload is off.
    pub controller_url: String,
    /// Software Security Center URL, used when SSC upload is on.
    pub ssc_url: String,
}

/// Per-job scan settings.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct JobConfig {
    pub build_id: String,
    /// Maximum heap for the scan, e.g. `4G`; emitted as `-Xmx4G`.
    pub xmx: String,
    pub build_label: String,
    pub build_project: String,
    pub build_version: String,
    /// Upload results to SSC instead of the controller.
    pub use_ssc: bool,
    pub ssc_token: String,
    pub up_token: String,
    pub version_id: String,
    /// Free-form extra scan arguments, passed through verbatim.
    pub scan_args: String,
    pub filter: String,
    pub no_default_rules: bool,
    pub disable_source_rendering: bool,
    pub disable_snippets: bool,
    pub quick: bool,
    /// Rulepack references separated by tabs, newlines or commas.
    pub rules: String,
    pub workers: String,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. If `path` is `None`, try `cloudscan.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the explicit path does not exist, the file
    /// cannot be read, or its TOML content fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let config_path = match path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => return Err(ConfigError::NotFound(p.to_path_buf())),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|source| {
                    ConfigError::Read {
                        path: path.clone(),
                        source,
                    }
                })?;
                let config = toml::from_str(&content)
                    .map_err(|source| ConfigError::Parse { path, source })?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }

    /// The executable to run: [`ToolConfig::exe_path`] or `cloudscan`.
    pub fn command(&self) -> &str {
        let exe = self.tool.exe_path.trim();
        if exe.is_empty() {
            DEFAULT_COMMAND
        } else {
            exe
        }
    }

    /// Builds scan options, substituting `${VAR}` from the process
    /// environment overlaid with `[env]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the resulting command is blank.
    pub fn to_scan_options(&self) -> Result<ScanOptions, ConfigError> {
        self.to_scan_options_with(std::env::vars().collect())
    }

    /// Like [`to_scan_options`](Self::to_scan_options) with an explicit base
    /// environment instead of the process environment.
    pub fn to_scan_options_with(
        &self,
        mut environment: HashMap<String, String>,
    ) -> Result<ScanOptions, ConfigError> {
        environment.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        let sub = |value: &str| substitute_variables(value, &environment);

        ScanOptions::builder(sub(self.command()))
            .base_args(self.base_args(&sub))
            .rules(split_rules(&self.job.rules).into_iter().map(|r| sub(&r)))
            .scan_args(self.scan_args(&sub))
            .envs(self.env.iter().map(|(k, v)| (k.clone(), v.clone())))
            .workspace(sub(&self.workspace))
            .build()
    }

    fn base_args(&self, sub: &impl Fn(&str) -> String) -> Vec<String> {
        let job = &self.job;
        let mut args = Vec::new();

        if job.use_ssc {
            append(&mut args, sub(&self.tool.ssc_url), "-sscurl");
            append(&mut args, sub(&job.ssc_token), "-ssctoken");
            append(&mut args, ArgValue::Absent, "start");
            append(&mut args, ArgValue::Absent, "-upload");
            append(&mut args, sub(&job.version_id), "-versionid");
            append(&mut args, sub(&job.up_token), "-uptoken");
        } else {
            append(&mut args, sub(&self.tool.controller_url), "-url");
            append(&mut args, ArgValue::Absent, "start");
        }
        append(&mut args, sub(&job.build_id), "-b");
        append(&mut args, sub(&job.filter), "-filter");
        append(&mut args, job.no_default_rules, "-no-default-rules");
        args
    }

    fn scan_args(&self, sub: &impl Fn(&str) -> String) -> Vec<String> {
        let job = &self.job;
        let mut args = Vec::new();

        append(&mut args, ArgValue::Absent, "-scan");
        append_concat(&mut args, sub(&job.xmx), "-Xmx");
        append(&mut args, sub(&job.build_label), "-build-label");
        append(&mut args, sub(&job.build_project), "-build-project");
        append(&mut args, sub(&job.build_version), "-build-version");
        // Pre-formed flags pass through one token per word.
        for token in sub(&job.scan_args).split_whitespace() {
            append(&mut args, ArgValue::Absent, token);
        }
        append(&mut args, job.disable_source_rendering, "-disable-source-rendering");
        append(
            &mut args,
            job.disable_snippets,
            "-Dcom.fortify.sca.FVDLDisableSnippets=true",
        );
        append(&mut args, job.quick, "-quick");
        append(&mut args, sub(&job.workers), "-j");
        args
    }
}

/// Splits a rules field on tabs, newlines, carriage returns and commas,
/// dropping blank entries.
///
/// # Examples
///
/// ```
/// use cloudscan_runner::config::split_rules;
///
/// assert_eq!(
///     split_rules("a.xml,\thttps://x/b.zip\n\n c.xml "),
///     vec!["a.xml", "https://x/b.zip", "c.xml"]
/// );
/// ```
pub fn split_rules(rules: &str) -> Vec<String> {
    rules
        .split(['\t', '\n', '\r', ','])
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Replaces `${NAME}` with the value of `NAME` in `environment`.
///
/// Unknown variables are left untouched.
pub fn substitute_variables(value: &str, environment: &HashMap<String, String>) -> String {
    static RE_VARIABLE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_.]*)\}").unwrap());

    RE_VARIABLE
        .replace_all(value, |caps: &regex::Captures<'_>| {
            environment
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
