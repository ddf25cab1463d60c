//! Error types for catalog regeneration.

use crate::catalog::error::CatalogError;
use thiserror::Error;

/// Errors arising while querying a provider API or rewriting the catalog.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The provider identifier is not one the updater knows.
    #[error("unknown provider \"{value}\"; expected adoptium or semeru")]
    UnknownProvider {
        /// The rejected identifier.
        value: String,
    },

    /// An API request failed.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// Description of the failure.
        reason: String,
    },

    /// An API response could not be decoded.
    #[error("unexpected response from {url}: {reason}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },

    /// The endpoint returned no usable release for a feature version.
    #[error("{provider} returned no {release_type} releases for JDK {major}")]
    NoReleases {
        /// Provider identifier.
        provider: String,
        /// Feature version that was queried.
        major: u32,
        /// `ga` or `ea`.
        release_type: String,
    },

    /// The newest release carries no binary for the platform.
    #[error("{provider} JDK {major} has no binary for {platform}")]
    NoBinary {
        /// Provider identifier.
        provider: String,
        /// Feature version that was queried.
        major: u32,
        /// Target triple.
        platform: String,
    },

    /// A published checksum is not a SHA-256 digest.
    #[error("{provider} JDK {major} has an invalid checksum: {reason}")]
    InvalidChecksum {
        /// Provider identifier.
        provider: String,
        /// Feature version that was queried.
        major: u32,
        /// Description of the validation failure.
        reason: String,
    },

    /// Reading or writing the catalog file failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
