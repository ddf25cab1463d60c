//! Error types for catalog loading and release resolution.

use super::selector::RollingAlias;
use crate::artefact::error::ArtefactError;
use thiserror::Error;

/// Errors arising while reading a catalog or resolving a selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The version selector is neither a major version nor a known alias.
    #[error("invalid version selector \"{value}\"; expected a major version, latest, stable, or lts")]
    InvalidSelector {
        /// The rejected selector.
        value: String,
    },

    /// The catalog has no entries for the platform.
    #[error("catalog has no entries for platform {platform}")]
    UnknownPlatform {
        /// The requested platform triple.
        platform: String,
    },

    /// The catalog has no entries for the provider on this platform.
    #[error("provider {provider} not found for {platform}; available: {available}")]
    UnknownProvider {
        /// The requested platform triple.
        platform: String,
        /// The requested provider identifier.
        provider: String,
        /// Comma-separated providers that do exist.
        available: String,
    },

    /// The provider's alias table has no entry for the alias.
    #[error("provider {provider} does not define the {alias} alias")]
    UnknownAlias {
        /// The provider identifier.
        provider: String,
        /// The alias that has no target.
        alias: RollingAlias,
    },

    /// The provider has no record for the major version.
    #[error("provider {provider} has no JDK {major}; available: {available}")]
    UnknownVersion {
        /// The provider identifier.
        provider: String,
        /// The requested or alias-resolved major version.
        major: u32,
        /// Comma-separated majors that do exist.
        available: String,
    },

    /// A provider identifier is empty or malformed.
    #[error("invalid provider identifier \"{value}\"")]
    InvalidProvider {
        /// The rejected identifier.
        value: String,
    },

    /// The catalog document could not be parsed.
    #[error("catalog parse error: {reason}")]
    Parse {
        /// Description of the parse failure.
        reason: String,
    },

    /// The catalog file could not be read or written.
    #[error("catalog I/O error on {path}: {reason}")]
    Io {
        /// The catalog path.
        path: String,
        /// Description of the I/O failure.
        reason: String,
    },

    /// An identity value inside the catalog failed validation.
    #[error(transparent)]
    Artefact(#[from] ArtefactError),
}

/// Result type alias using [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
