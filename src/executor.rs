//! External process execution with live output relay.
//!
//! # How it works
//!
//! 1. Spawns `argv[0]` with the remaining tokens as arguments. No shell is
//!    involved unless the caller built a shell-wrapped argv itself.
//! 2. The child inherits this process's environment overlaid with the
//!    caller's variables (the caller wins on conflict). Stdin is closed.
//! 3. Two reader threads start right after the spawn, one per output stream,
//!    and forward every line to the [`ConsoleLogger`] as it arrives.
//! 4. The calling thread blocks on the exit status, then joins both readers
//!    so all buffered output is logged before the result is returned.
//!
//! Draining both pipes concurrently is required: a child that fills the OS
//! pipe buffer on one stream while nobody reads it blocks forever.

use crate::logger::ConsoleLogger;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;

/// Exit code reported when the process could not be spawned or waited on, or
/// was terminated by a signal.
pub const FAILED_EXIT_CODE: i32 = -1;

/// Outcome of one process execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub exit_code: i32,
    pub succeeded: bool,
}

impl ProcessResult {
    pub fn from_exit_code(exit_code: i32) -> Self {
        ProcessResult {
            exit_code,
            succeeded: exit_code == 0,
        }
    }

    /// Result for a process that never ran to completion.
    pub fn failed() -> Self {
        Self::from_exit_code(FAILED_EXIT_CODE)
    }
}

/// Spawns external processes and relays their output to a [`ConsoleLogger`].
#[derive(Clone)]
pub struct ProcessExecutor {
    logger: ConsoleLogger,
    current_dir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new(logger: ConsoleLogger) -> Self {
        ProcessExecutor {
            logger,
            current_dir: None,
        }
    }

    /// Runs processes in `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Executes `argv` and waits for it to exit.
    ///
    /// Never fails: an empty argv, a spawn failure (missing executable,
    /// permission denied) or a failed wait is logged and reported as a
    /// failed [`ProcessResult`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use std::collections::BTreeMap;
    /// use cloudscan_runner::executor::ProcessExecutor;
    /// use cloudscan_runner::logger::ConsoleLogger;
    ///
    /// let executor = ProcessExecutor::new(ConsoleLogger::stderr());
    /// let argv = vec!["echo".to_string(), "hello".to_string()];
    /// assert!(executor.execute(&argv, &BTreeMap::new()).succeeded);
    /// ```
    pub fn execute(&self, argv: &[String], env: &BTreeMap<String, String>) -> ProcessResult {
        let Some((program, args)) = argv.split_first() else {
            self.logger
                .log("ERROR: Failed to execute command: the command line is empty");
            return ProcessResult::failed();
        };

        tracing::debug!(program = %program, args = ?args, "spawning process");

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.logger
                    .log(&format!("ERROR: Failed to execute {program}: {e}"));
                return ProcessResult::failed();
            }
        };

        let readers: Vec<JoinHandle<()>> = [
            child.stdout.take().map(|s| self.spawn_reader(s)),
            child.stderr.take().map(|s| self.spawn_reader(s)),
        ]
        .into_iter()
        .flatten()
        .collect();

        let status = child.wait();

        for reader in readers {
            if reader.join().is_err() {
                tracing::warn!("output reader thread panicked");
            }
        }

        match status {
            Ok(status) => {
                tracing::debug!(program = %program, status = %status, "process exited");
                ProcessResult::from_exit_code(status.code().unwrap_or(FAILED_EXIT_CODE))
            }
            Err(e) => {
                self.logger.log(&format!(
                    "ERROR: Failed to wait for {program} to finish: {e}"
                ));
                ProcessResult::failed()
            }
        }
    }

    fn spawn_reader<R: Read + Send + 'static>(&self, stream: R) -> JoinHandle<()> {
        let logger = self.logger.clone();
        std::thread::spawn(move || relay_lines(stream, &logger))
    }
}

/// Logs every line of `stream` until end of file. Invalid UTF-8 is replaced
/// rather than aborting the relay.
fn relay_lines<R: Read>(stream: R, logger: &ConsoleLogger) {
    let reader = BufReader::new(stream);
    for line in reader.split(b'\n') {
        match line {
            Ok(mut bytes) => {
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
                logger.log(&String::from_utf8_lossy(&bytes));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read process output");
                break;
            }
        }
    }
}

/// Returns `true` if `cmd` can be executed: either a path to an existing
/// file, or a bare name found on `PATH`.
///
/// On Unix the file must also have an executable permission bit set.
pub fn which_exists(cmd: &str) -> bool {
    let direct = Path::new(cmd);
    if direct.components().count() > 1 {
        return is_executable(direct);
    }

    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).any(|dir| is_executable(&dir.join(cmd))))
        .unwrap_or(false)
}

fn is_executable(candidate: &Path) -> bool {
    if !candidate.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(candidate)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        true
    }
}
