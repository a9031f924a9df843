//! # cloudscan-runner
//!
//! Runs the `cloudscan` static-analysis command line as a build-pipeline step.
//!
//! Given a [`ScanOptions`](options::ScanOptions) value the runner resolves every
//! rulepack reference (a local path or a URL, possibly to a `.zip` archive) into
//! a local path, assembles one correctly quoted argument vector, and executes it
//! while relaying the process output to the build console line by line.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cloudscan_runner::logger::ConsoleLogger;
//! use cloudscan_runner::options::ScanOptions;
//! use cloudscan_runner::orchestrator::ScanOrchestrator;
//!
//! let options = ScanOptions::builder("cloudscan")
//!     .base_args(["-url", "https://controller.example.com", "start", "-b", "web"])
//!     .rule("https://rules.example.com/custom-rules.zip")
//!     .scan_args(["-scan", "-Xmx4G"])
//!     .build()
//!     .expect("command is not blank");
//!
//! let orchestrator = ScanOrchestrator::new(ConsoleLogger::stderr());
//! let report = orchestrator.perform(&options);
//! std::process::exit(if report.succeeded { 0 } else { 1 });
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around a pipeline:
//!
//! 1. **[`config`]**: load a job description from TOML and turn it into
//!    [`options::ScanOptions`].
//! 2. **[`resolver`]**: turn rulepack references into local paths, downloading
//!    and extracting ([`archive`]) as needed.
//! 3. **[`args`]**: quote `(flag, value)` pairs into command tokens and render
//!    shell command strings.
//! 4. **[`executor`]**: spawn the external process and drain stdout/stderr
//!    concurrently into the [`logger`].
//! 5. **[`orchestrator`]**: compose the above, producing a [`report::RunReport`].
//! 6. **[`output`]**: format reports as pretty text or JSON.

pub mod archive;
pub mod args;
pub mod config;
pub mod error;
pub mod executor;
pub mod logger;
pub mod options;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod resolver;
