//! Build-console logger.
//!
//! Every line written through a [`ConsoleLogger`] carries the
//! `[cloudscan-runner] ` tag, including the continuation lines of a
//! multi-line message. The logger is a cheap cloneable handle; all clones
//! share one mutex-guarded writer so the stdout and stderr reader threads of
//! the [`executor`](crate::executor) can log concurrently without
//! interleaving inside a line.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Name used for the console tag and for the rulepack download namespace.
pub const PLUGIN_NAME: &str = "cloudscan-runner";

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Tagged, thread-safe line logger.
///
/// # Examples
///
/// ```
/// use cloudscan_runner::logger::ConsoleLogger;
///
/// let (logger, captured) = ConsoleLogger::capture();
/// logger.log("first\nsecond");
/// assert_eq!(
///     captured.lines(),
///     vec!["[cloudscan-runner] first", "[cloudscan-runner] second"]
/// );
/// ```
#[derive(Clone)]
pub struct ConsoleLogger {
    sink: Sink,
    tag: String,
}

impl ConsoleLogger {
    /// Creates a logger writing to `writer`.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        ConsoleLogger {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            tag: format!("[{PLUGIN_NAME}] "),
        }
    }

    /// Creates a logger writing to the process's standard error.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }

    /// Creates a logger backed by an in-memory buffer, returning the buffer
    /// handle alongside it.
    pub fn capture() -> (Self, CapturedLog) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let logger = Self::new(SharedBuffer(Arc::clone(&buffer)));
        (logger, CapturedLog(buffer))
    }

    /// Writes `message` as one or more tagged lines.
    ///
    /// The whole message is written under a single lock acquisition. Write
    /// errors are ignored: losing console output must never fail a scan.
    pub fn log(&self, message: &str) {
        let continuation = format!("\n{}", self.tag);
        let text = format!("{}{}\n", self.tag, message.replace('\n', &continuation));

        let mut sink = self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = sink.write_all(text.as_bytes());
        let _ = sink.flush();
    }
}

/// Read side of a [`ConsoleLogger::capture`] logger.
#[derive(Clone)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    /// Everything logged so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Logged lines without their trailing newline.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
