//! Zip extraction for downloaded rulepacks.

use crate::error::ArchiveError;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Size of the copy buffer used per entry; entries are never held in memory.
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Counts from one [`unzip`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    /// Raw names of entries that were not extracted because they are
    /// absolute or would land outside the target directory.
    pub skipped: Vec<String>,
}

/// Returns `true` if `path` has a `.zip` extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cloudscan_runner::archive::is_archive;
///
/// assert!(is_archive(Path::new("/tmp/rules.ZIP")));
/// assert!(!is_archive(Path::new("/tmp/rules.xml")));
/// ```
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false)
}

/// Extracts `archive` into `target_dir`, creating it if needed.
///
/// Directory entries create the matching nested directory; file entries
/// create their parents and are copied through a fixed-size buffer. Entries
/// whose path is absolute or contains `..` segments escaping `target_dir`
/// are skipped and reported in [`ExtractSummary::skipped`].
///
/// Files extracted before a failure are left in place.
///
/// # Errors
///
/// Returns [`ArchiveError`] when the archive cannot be opened or read, or an
/// output file or directory cannot be written.
pub fn unzip(target_dir: &Path, archive: &Path) -> Result<ExtractSummary, ArchiveError> {
    fs::create_dir_all(target_dir).map_err(|source| io_error(target_dir, source))?;

    let file = File::open(archive).map_err(|source| io_error(archive, source))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| zip_error(archive, source))?;

    let mut summary = ExtractSummary::default();
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|source| zip_error(archive, source))?;

        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            summary.skipped.push(entry.name().to_string());
            continue;
        };
        let out_path = target_dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|source| io_error(&out_path, source))?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let out_file = File::create(&out_path).map_err(|source| io_error(&out_path, source))?;
        let mut writer = BufWriter::new(out_file);
        loop {
            let count = entry
                .read(&mut buffer)
                .map_err(|source| io_error(archive, source))?;
            if count == 0 {
                break;
            }
            writer
                .write_all(&buffer[..count])
                .map_err(|source| io_error(&out_path, source))?;
        }
        writer.flush().map_err(|source| io_error(&out_path, source))?;
        summary.files += 1;
    }

    Ok(summary)
}

fn io_error(path: &Path, source: std::io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: PathBuf::from(path),
        source,
    }
}

fn zip_error(path: &Path, source: zip::result::ZipError) -> ArchiveError {
    ArchiveError::Zip {
        path: PathBuf::from(path),
        source,
    }
}
