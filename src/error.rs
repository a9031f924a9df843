//! Error types.
//!
//! Only the fallible internals return these. The public resolution and
//! execution entry points log failures through the
//! [`ConsoleLogger`](crate::logger::ConsoleLogger) and degrade to an absent
//! path or a failed result instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one rulepack reference into a local path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The reference is not a URL and no file exists at that path.
    #[error("Rulepack not found: {0}")]
    NotFound(String),

    /// The server answered with something other than `200 OK`.
    #[error("Remote file cannot be downloaded from {url}. Status Code: {status} - {reason}")]
    Http {
        url: String,
        status: u16,
        reason: String,
    },

    /// Connection, TLS or protocol failure.
    #[error("An error occurred while attempting to download rulepack from {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Failure creating the download directory or writing the body.
    #[error("An error occurred while saving the rulepack to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred while extracting archive: {0}")]
    Archive(#[from] ArchiveError),
}

/// Failure while extracting a `.zip` rulepack.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid zip archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Failure to load or interpret a job configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
