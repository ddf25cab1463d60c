//! Archive extraction for JDK distributions.
//!
//! Extracts `.tar.gz` and `.tar.zst` archives to a target directory with
//! path traversal protection, then locates the archive's single top-level
//! directory so it can become the installation root itself rather than a
//! nested child of it.

use std::fs;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

/// Compression wrapped around the tar stream, chosen by file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// `.tar.gz` or `.tgz`.
    TarGz,
    /// `.tar.zst` or `.tzst`.
    TarZst,
    /// Uncompressed `.tar`.
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from an archive file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use jdk_installer::artefact::extraction::ArchiveFormat;
    ///
    /// let format = ArchiveFormat::from_file_name("OpenJDK21U-jdk_x64_linux.tar.gz");
    /// assert_eq!(format, Some(ArchiveFormat::TarGz));
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if lower.ends_with(".tar.zst") || lower.ends_with(".tzst") {
            Some(Self::TarZst)
        } else if lower.ends_with(".tar") {
            Some(Self::Tar)
        } else {
            None
        }
    }
}

/// Trait for extracting archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use jdk_installer::artefact::extraction::TarExtractor;
///
/// let extractor = TarExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the archive-relative paths of the extracted entries.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry
    /// attempts to escape the destination directory.
    /// Returns [`ExtractionError::EmptyArchive`] if no entries are found.
    /// Returns [`ExtractionError::UnsupportedFormat`] for unknown file names.
    /// Returns [`ExtractionError::Io`] on I/O failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no entries.
    #[error("archive contains no files")]
    EmptyArchive,

    /// The archive file name does not identify a supported format.
    #[error("unsupported archive format: {name}")]
    UnsupportedFormat {
        /// The archive file name.
        name: String,
    },
}

/// Default extractor using the `tar`, `flate2`, and `zstd` crates.
///
/// Validates each entry path before extraction to guard against
/// path traversal attacks.
pub struct TarExtractor;

impl ArchiveExtractor for TarExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let name = archive_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let format = ArchiveFormat::from_file_name(&name)
            .ok_or(ExtractionError::UnsupportedFormat { name })?;

        let file = fs::File::open(archive_path)?;
        let reader: Box<dyn Read> = match format {
            ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
            ArchiveFormat::TarZst => Box::new(zstd::Decoder::new(file)?),
            ArchiveFormat::Tar => Box::new(file),
        };
        unpack_tar(reader, dest_dir)
    }
}

fn unpack_tar(reader: impl Read, dest_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_mtime(true);
    let mut extracted = Vec::new();

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;
        entry.unpack_in(dest_dir)?;
        extracted.push(entry_path);
    }

    if extracted.is_empty() {
        return Err(ExtractionError::EmptyArchive);
    }
    log::debug!(
        "extracted {} entries into {}",
        extracted.len(),
        dest_dir.display()
    );
    Ok(extracted)
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    if path.is_absolute() {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(ExtractionError::PathTraversal {
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Return the directory that should become the installation root.
///
/// Vendor archives wrap their content in one directory such as
/// `jdk-21.0.2+13/`. When `unpack_dir` holds exactly one directory and
/// nothing else, that directory is returned; otherwise `unpack_dir` itself.
///
/// # Errors
///
/// Returns an I/O error if `unpack_dir` cannot be listed.
pub fn archive_root(unpack_dir: &Path) -> std::io::Result<PathBuf> {
    let mut entries = fs::read_dir(unpack_dir)?.collect::<std::io::Result<Vec<_>>>()?;
    if entries.len() == 1 {
        if let Some(only) = entries.pop() {
            if only.file_type()?.is_dir() {
                return Ok(only.path());
            }
        }
    }
    Ok(unpack_dir.to_path_buf())
}
