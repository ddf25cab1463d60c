//! Error types for the JDK installer.
//!
//! Each stage of the pipeline has its own error enum; this module folds them
//! into [`InstallerError`] so the binary can report any failure with a single
//! actionable message.

use crate::artefact::download::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::verification::VerificationError;
use crate::catalog::error::CatalogError;
use crate::elf::ElfError;
use crate::updater::error::UpdateError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving, installing, or finalizing a JDK.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Catalog lookup or parsing failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The archive could not be fetched.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The archive failed its integrity check or could not be hashed.
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The archive could not be unpacked.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Reading or rewriting ELF metadata failed.
    #[error(transparent)]
    Elf(#[from] ElfError),

    /// The unpacked tree does not have the layout the relocation rules expect.
    #[error("unexpected JDK layout: {reason}")]
    LayoutDrift {
        /// Description of what was missing or malformed.
        reason: String,
    },

    /// A launcher script could not be written.
    #[error("wrapper generation failed for {path}: {reason}")]
    WrapperGeneration {
        /// The executable being wrapped.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path of the offending configuration file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// The installation destination is already occupied.
    #[error("destination {path} already exists; remove it or choose another --out")]
    DestinationExists {
        /// The occupied destination.
        path: Utf8PathBuf,
    },

    /// A path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the path.
        path: String,
    },

    /// A configured file pattern is not a valid glob.
    #[error("invalid file pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Description of the syntax error.
        reason: String,
    },

    /// The configured home variable is not a valid shell identifier.
    #[error("invalid home variable \"{name}\"; expected a shell identifier such as JAVA_HOME")]
    InvalidHomeVariable {
        /// The rejected name.
        name: String,
    },

    /// No platform was given and the host is not a supported platform.
    #[error("cannot detect a supported platform for this host; pass --platform")]
    UnknownHostPlatform,

    /// An external tool did not finish in time.
    #[error("{command} timed out after {seconds} seconds")]
    CommandTimeout {
        /// The command that was killed.
        command: String,
        /// The timeout that elapsed.
        seconds: u64,
    },

    /// Regenerating the catalog from a provider API failed.
    #[error(transparent)]
    Update(#[from] UpdateError),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

impl InstallerError {
    /// Build a [`InstallerError::NonUtf8Path`] from any path.
    pub fn non_utf8(path: &std::path::Path) -> Self {
        Self::NonUtf8Path {
            path: path.display().to_string(),
        }
    }
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
