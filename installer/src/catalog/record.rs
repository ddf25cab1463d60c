//! Catalog entries and resolved distribution records.

use crate::artefact::sha256_digest::Sha256Digest;
use serde::{Deserialize, Serialize};

/// One downloadable build as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    /// Feature release number, e.g. `21`.
    pub major_version: u32,
    /// Full version string, e.g. `21.0.2+13`.
    pub version: String,
    /// Archive download URL.
    pub url: String,
    /// Expected SHA-256 of the archive.
    pub sha256: Sha256Digest,
}

/// The resolved metadata for one specific JDK build.
///
/// Immutable once resolved; everything downstream of catalog lookup works
/// from this value alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionRecord {
    /// Provider identifier, e.g. `adoptium`.
    pub provider: String,
    /// Feature release number.
    pub major_version: u32,
    /// Full version string.
    pub version: String,
    /// Archive download URL.
    pub url: String,
    /// Expected SHA-256 of the archive.
    pub sha256: Sha256Digest,
}

impl DistributionRecord {
    /// Build a record from a catalog entry.
    #[must_use]
    pub fn from_entry(provider: &str, entry: &SourceEntry) -> Self {
        Self {
            provider: provider.to_owned(),
            major_version: entry.major_version,
            version: entry.version.clone(),
            url: entry.url.clone(),
            sha256: entry.sha256.clone(),
        }
    }

    /// File name for the downloaded archive, taken from the URL path.
    ///
    /// Falls back to a name derived from the record when the URL ends in a
    /// slash or carries no path.
    ///
    /// # Examples
    ///
    /// ```
    /// use jdk_installer::artefact::sha256_digest::Sha256Digest;
    /// use jdk_installer::catalog::record::DistributionRecord;
    ///
    /// let record = DistributionRecord {
    ///     provider: "adoptium".to_owned(),
    ///     major_version: 21,
    ///     version: "21.0.2+13".to_owned(),
    ///     url: "https://example.test/OpenJDK21U-jdk_x64_linux.tar.gz?x=1".to_owned(),
    ///     sha256: Sha256Digest::try_from("a".repeat(64)).expect("valid"),
    /// };
    /// assert_eq!(record.archive_file_name(), "OpenJDK21U-jdk_x64_linux.tar.gz");
    /// ```
    #[must_use]
    pub fn archive_file_name(&self) -> String {
        let without_query = self.url.split(['?', '#']).next().unwrap_or_default();
        match without_query.rsplit('/').next() {
            Some(name) if !name.is_empty() && !name.contains(':') => name.to_owned(),
            _ => format!("{}-{}.tar.gz", self.provider, self.version.replace('+', "_")),
        }
    }

    /// A directory name that identifies this build, e.g. `adoptium-21.0.2+13`.
    #[must_use]
    pub fn install_dir_name(&self) -> String {
        format!("{}-{}", self.provider, self.version)
    }
}
