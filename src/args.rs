//! Command-line token building.
//!
//! [`append`] turns a `(value, flag)` pair into zero, one or two tokens
//! according to the kind of value:
//!
//! | Value | Emitted |
//! |-------|---------|
//! | [`ArgValue::Absent`] | `flag` (bare switch), nothing if `flag` is empty |
//! | [`ArgValue::Text`] blank | nothing |
//! | [`ArgValue::Text`] | `flag`, `value` (or `flag+value` when concatenated) |
//! | [`ArgValue::Flag`] `true` | `flag` |
//! | [`ArgValue::Flag`] `false` | nothing |
//!
//! Text values containing a space are wrapped in double quotes. Nothing else
//! is escaped: embedded quotes and shell metacharacters pass through as-is,
//! and downstream consumers rely on exactly this behaviour.

/// A value attached to a command-line flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// No value; the flag is a bare switch.
    Absent,
    /// A textual value.
    Text(String),
    /// A boolean toggle.
    Flag(bool),
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Flag(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        ArgValue::Text(value.clone())
    }
}

/// Appends `flag` and `value` to `tokens` as two separate tokens.
///
/// # Examples
///
/// ```
/// use cloudscan_runner::args::{append, ArgValue};
///
/// let mut tokens = Vec::new();
/// append(&mut tokens, ArgValue::Absent, "start");
/// append(&mut tokens, "my build", "-b");
/// append(&mut tokens, false, "-quick");
/// assert_eq!(tokens, vec!["start", "-b", "\"my build\""]);
/// ```
pub fn append(tokens: &mut Vec<String>, value: impl Into<ArgValue>, flag: &str) {
    push(tokens, value.into(), flag, false);
}

/// Appends `flag` and `value` joined into a single token (e.g. `-Xmx4G`).
///
/// Absent and boolean values behave exactly as in [`append`].
pub fn append_concat(tokens: &mut Vec<String>, value: impl Into<ArgValue>, flag: &str) {
    push(tokens, value.into(), flag, true);
}

fn push(tokens: &mut Vec<String>, value: ArgValue, flag: &str, concatenate: bool) {
    match value {
        ArgValue::Absent => {
            if !flag.is_empty() {
                tokens.push(flag.to_string());
            }
        }
        ArgValue::Text(text) => {
            if text.trim().is_empty() {
                return;
            }
            let text = if text.contains(' ') {
                format!("\"{text}\"")
            } else {
                text
            };
            if concatenate {
                tokens.push(format!("{flag}{text}"));
            } else {
                tokens.push(flag.to_string());
                tokens.push(text);
            }
        }
        ArgValue::Flag(enabled) => {
            if enabled {
                tokens.push(flag.to_string());
            }
        }
    }
}

/// Joins tokens with single spaces, trimming the ends.
pub fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Shell used to wrap a rendered command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlavor {
    /// `sh -c '...'`
    Posix,
    /// `cmd /c ...`
    Windows,
}

impl ShellFlavor {
    /// The flavor matching the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            ShellFlavor::Windows
        } else {
            ShellFlavor::Posix
        }
    }
}

/// Renders tokens as a command line for the host's shell.
///
/// Meant for callers that hand the command to another host or channel
/// instead of spawning it directly.
///
/// # Examples
///
/// ```
/// # #[cfg(unix)] {
/// use cloudscan_runner::args::render_shell_command;
///
/// assert_eq!(render_shell_command(&["a", "b", "c"]), "sh -c 'a b c'");
/// # }
/// ```
pub fn render_shell_command<S: AsRef<str>>(tokens: &[S]) -> String {
    render_shell_command_for(ShellFlavor::host(), tokens)
}

/// Renders tokens as a command line for an explicit shell flavor.
pub fn render_shell_command_for<S: AsRef<str>>(flavor: ShellFlavor, tokens: &[S]) -> String {
    let line = join(tokens);
    match flavor {
        ShellFlavor::Windows => format!("cmd /c {line}"),
        ShellFlavor::Posix => format!("sh -c '{line}'"),
    }
}
