//! JSON output formatter.

use serde::Serialize;

/// Serializes `value` as pretty-printed JSON followed by a newline.
///
/// # Panics
///
/// Panics if the value cannot be serialized (should not happen with the
/// report types of this crate).
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    let mut out = serde_json::to_string_pretty(value).expect("JSON serialization failed");
    out.push('\n');
    out
}
