//! Rulepack resolution.
//!
//! A rulepack reference is either a local path or an `http(s)` URL. Remote
//! references are downloaded into a fresh directory
//! `{temp root}/cloudscan-runner/{random UUID}`; `.zip` downloads are then
//! extracted in place and the archive itself removed.
//!
//! [`RulepackResolver::resolve_in`] takes the scan's workspace as a base:
//! relative local references are looked up under it, and downloads land in
//! `{workspace}/cloudscan-runner/{random UUID}` unless an explicit temp
//! directory was configured. Resolved paths are always absolute so they stay
//! valid whatever working directory the scan runs in.
//!
//! Failures never propagate: [`RulepackResolver::resolve`] logs what went
//! wrong and returns `None` so the remaining references still resolve.

use crate::archive;
use crate::error::ResolveError;
use crate::logger::{ConsoleLogger, PLUGIN_NAME};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{StatusCode, Url};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

/// File name used when neither the response nor the URL provide one.
const FALLBACK_FILE_NAME: &str = "rulepack";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Classification of a rulepack reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleReference {
    Local(PathBuf),
    Remote(Url),
}

impl RuleReference {
    /// Classifies `reference`.
    ///
    /// `http` and `https` URLs are remote and `file` URLs map to their local
    /// path. Anything else, including strings that do not parse as a URL
    /// and Windows drive paths such as `C:\rules`, is a local path.
    ///
    /// # Examples
    ///
    /// ```
    /// use cloudscan_runner::resolver::RuleReference;
    ///
    /// assert!(matches!(
    ///     RuleReference::classify("https://example.com/rules.zip"),
    ///     RuleReference::Remote(_)
    /// ));
    /// assert!(matches!(
    ///     RuleReference::classify("/opt/rules/custom.xml"),
    ///     RuleReference::Local(_)
    /// ));
    /// ```
    pub fn classify(reference: &str) -> Self {
        match Url::parse(reference) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => RuleReference::Remote(url),
            Ok(url) if url.scheme() == "file" => match url.to_file_path() {
                Ok(path) => RuleReference::Local(path),
                Err(()) => RuleReference::Local(PathBuf::from(reference)),
            },
            _ => RuleReference::Local(PathBuf::from(reference)),
        }
    }
}

/// A file fetched by one download, before any extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    /// Per-download directory; becomes the resolved path for archives.
    pub dir: PathBuf,
    pub file_name: String,
    pub is_archive: bool,
}

impl DownloadedArtifact {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Turns rulepack references into local paths.
pub struct RulepackResolver {
    logger: ConsoleLogger,
    temp_root: PathBuf,
    /// Set once [`with_temp_dir`](Self::with_temp_dir) took effect; a
    /// workspace then no longer redirects downloads.
    temp_overridden: bool,
    client: Option<Client>,
}

impl RulepackResolver {
    /// Creates a resolver downloading under the system temporary directory.
    pub fn new(logger: ConsoleLogger) -> Self {
        RulepackResolver {
            logger,
            temp_root: std::env::temp_dir(),
            temp_overridden: false,
            client: None,
        }
    }

    /// Downloads under `dir` instead of the system temporary directory.
    ///
    /// The directory is created when missing. If it still is not a directory
    /// afterwards a warning is logged and the current root is kept.
    pub fn with_temp_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::debug!(dir = %dir.display(), error = %e, "cannot create temp dir");
            }
        }
        if dir.is_dir() {
            self.temp_root = dir.to_path_buf();
            self.temp_overridden = true;
        } else {
            self.logger.log(&format!(
                "WARNING: {} is not a usable directory, downloading rulepacks to {}",
                dir.display(),
                self.temp_root.display()
            ));
        }
        self
    }

    /// Uses a preconfigured HTTP client (proxy, TLS roots, timeouts).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Root under which `cloudscan-runner/{uuid}` download directories are created.
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Resolves one reference to an absolute local file or directory path.
    ///
    /// Returns `None` if the local path does not exist or the download or
    /// extraction fails; the reason is logged.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        self.resolve_in(reference, None)
    }

    /// Like [`resolve`](Self::resolve), using `workspace` as the base
    /// directory.
    ///
    /// Relative local references are looked up under `workspace`. Downloads
    /// go under `workspace` too, unless a temp directory override is set.
    /// A `workspace` that is not an existing directory is ignored.
    pub fn resolve_in(&self, reference: &str, workspace: Option<&Path>) -> Option<PathBuf> {
        let workspace = workspace.filter(|dir| dir.is_dir());
        match self.try_resolve(reference, workspace) {
            Ok(path) => Some(path),
            Err(e) => {
                self.logger.log(&format!("ERROR: {e}"));
                None
            }
        }
    }

    /// Resolves every reference in order, dropping the ones that fail.
    pub fn resolve_all<S: AsRef<str>>(&self, references: &[S]) -> Vec<PathBuf> {
        references
            .iter()
            .filter_map(|r| self.resolve(r.as_ref()))
            .collect()
    }

    fn try_resolve(
        &self,
        reference: &str,
        workspace: Option<&Path>,
    ) -> Result<PathBuf, ResolveError> {
        match RuleReference::classify(reference) {
            RuleReference::Local(path) => {
                let path = match workspace {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path,
                };
                if path.exists() {
                    absolute(&path)
                } else {
                    Err(ResolveError::NotFound(reference.to_string()))
                }
            }
            RuleReference::Remote(url) => {
                let root = match workspace {
                    Some(base) if !self.temp_overridden => base,
                    _ => self.temp_root.as_path(),
                };
                let artifact = self.download(&url, &absolute(root)?)?;
                self.extract(artifact)
            }
        }
    }

    fn download(&self, url: &Url, root: &Path) -> Result<DownloadedArtifact, ResolveError> {
        self.logger
            .log(&format!("Downloading rulepack from {url}"));

        let transport = |source: reqwest::Error| ResolveError::Transport {
            url: url.to_string(),
            source,
        };

        let client = match &self.client {
            Some(client) => client.clone(),
            // Rulepacks can be large: bound connecting only, not the transfer.
            None => Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(None::<Duration>)
                .build()
                .map_err(transport)?,
        };

        let mut response = client.get(url.clone()).send().map_err(transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ResolveError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let dir = root
            .join(PLUGIN_NAME)
            .join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).map_err(|source| ResolveError::Io {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "created rulepack download directory");

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename)
            .or_else(|| filename_from_url(url))
            .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());

        let artifact = DownloadedArtifact {
            is_archive: archive::is_archive(Path::new(&file_name)),
            dir,
            file_name,
        };
        let path = artifact.path();

        let io_error = |source: std::io::Error| ResolveError::Io {
            path: path.clone(),
            source,
        };
        let mut file = File::create(&path).map_err(io_error)?;
        response.copy_to(&mut file).map_err(transport)?;
        file.sync_all().map_err(io_error)?;

        self.logger
            .log(&format!("Rulepack saved to {}", path.display()));
        Ok(artifact)
    }

    fn extract(&self, artifact: DownloadedArtifact) -> Result<PathBuf, ResolveError> {
        let path = artifact.path();
        if !artifact.is_archive {
            return Ok(path);
        }

        self.logger.log("Extracting rulepack archive");
        let extracted = archive::unzip(&artifact.dir, &path);

        // The archive goes whether or not extraction worked; partial output stays.
        if fs::remove_file(&path).is_ok() {
            self.logger.log("Removed original archive");
        }

        let summary = extracted?;
        for name in &summary.skipped {
            self.logger.log(&format!(
                "WARNING: Skipped archive entry outside the extraction directory: {name}"
            ));
        }
        self.log_contents(&artifact.dir);
        Ok(artifact.dir)
    }

    fn log_contents(&self, dir: &Path) {
        let files: Vec<String> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(dir)
                    .ok()
                    .map(|p| format!("  {}", p.display()))
            })
            .collect();
        self.logger.log(&format!(
            "Extracted {} rulepack file(s) to {}\n{}",
            files.len(),
            dir.display(),
            files.join("\n")
        ));
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ResolveError> {
    std::path::absolute(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits a header value on `;`, ignoring separators inside double quotes.
fn header_params(header: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in header.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => {
                params.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(&header[start..]);
    params
}

/// Extracts the `filename` parameter of an `attachment` Content-Disposition.
///
/// Only the final path component of the suggested name is kept.
fn attachment_filename(header: &str) -> Option<String> {
    let mut parts = header_params(header).into_iter();
    let disposition = parts.next()?.trim();
    if !disposition.eq_ignore_ascii_case("attachment") {
        return None;
    }

    parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        Path::new(value)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.trim().is_empty())
    })
}

/// Last non-empty path segment of `url`.
fn filename_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}
