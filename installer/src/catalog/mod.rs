//! Source catalog: which archive to fetch for a platform and selector.
//!
//! The catalog is a JSON document keyed by platform triple, then provider:
//!
//! ```json
//! {
//!   "x86_64-unknown-linux-gnu": {
//!     "adoptium": {
//!       "versions": {
//!         "21": { "major_version": 21, "version": "21.0.2+13", "url": "...", "sha256": "..." }
//!       },
//!       "aliases": { "latest": 21, "stable": 21, "lts": 21 }
//!     }
//!   }
//! }
//! ```
//!
//! Rolling aliases are an explicit table inside each provider entry. The
//! catalog updater rewrites the table whenever it regenerates the versions,
//! and resolution is a plain lookup through it.
//!
//! # Sub-modules
//!
//! - [`error`] — Catalog error types.
//! - [`record`] — Catalog entries and resolved records.
//! - [`selector`] — Major versions and rolling aliases.

pub mod error;
pub mod record;
pub mod selector;

use crate::artefact::platform::Platform;
use camino::Utf8Path;
use error::{CatalogError, Result};
use record::{DistributionRecord, SourceEntry};
use selector::{RollingAlias, VersionSelector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The releases one provider publishes for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderCatalog {
    /// Concrete builds keyed by major version.
    pub versions: BTreeMap<u32, SourceEntry>,
    /// Alias table mapping each rolling alias to a key of `versions`.
    #[serde(default)]
    pub aliases: BTreeMap<RollingAlias, u32>,
}

impl ProviderCatalog {
    /// Resolve `selector` to a major version present in `versions`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownAlias`] when the alias table has no
    /// entry and [`CatalogError::UnknownVersion`] when the major (given or
    /// alias-resolved) has no record.
    pub fn resolve_major(&self, provider: &str, selector: VersionSelector) -> Result<u32> {
        let major = match selector {
            VersionSelector::Major(major) => major,
            VersionSelector::Alias(alias) => {
                *self
                    .aliases
                    .get(&alias)
                    .ok_or_else(|| CatalogError::UnknownAlias {
                        provider: provider.to_owned(),
                        alias,
                    })?
            }
        };
        if self.versions.contains_key(&major) {
            Ok(major)
        } else {
            Err(CatalogError::UnknownVersion {
                provider: provider.to_owned(),
                major,
                available: self.available_majors(),
            })
        }
    }

    /// Comma-separated list of the majors this provider publishes.
    #[must_use]
    pub fn available_majors(&self) -> String {
        self.versions
            .keys()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The whole catalog document.
///
/// # Examples
///
/// ```
/// use jdk_installer::artefact::platform::Platform;
/// use jdk_installer::catalog::Catalog;
///
/// let json = format!(
///     concat!(
///         r#"{{"x86_64-unknown-linux-gnu":{{"adoptium":{{"#,
///         r#""versions":{{"21":{{"major_version":21,"version":"21.0.2+13","#,
///         r#""url":"https://example.test/jdk21.tar.gz","sha256":"{}"}}}},"#,
///         r#""aliases":{{"lts":21}}}}}}}}"#,
///     ),
///     "a".repeat(64)
/// );
/// let catalog = Catalog::from_json(&json).expect("valid catalog");
/// let platform = Platform::try_from("x86_64-unknown-linux-gnu").expect("supported");
/// let record = catalog
///     .resolve(&platform, "adoptium", "lts".parse().expect("selector"))
///     .expect("resolves");
/// assert_eq!(record.version, "21.0.2+13");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    platforms: BTreeMap<String, BTreeMap<String, ProviderCatalog>>,
}

impl Catalog {
    /// Parse a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] when the document is malformed or any
    /// entry fails validation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            reason: e.to_string(),
        })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be read and
    /// [`CatalogError::Parse`] when it is malformed.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&contents)
    }

    /// Read a catalog file, or start empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// As [`Catalog::load`], except that a missing file is not an error.
    pub fn load_or_default(path: &Utf8Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialise the catalog as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if serialisation fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| CatalogError::Parse {
            reason: e.to_string(),
        })?;
        json.push('\n');
        Ok(json)
    }

    /// Write the catalog to `path`, replacing the previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|e| CatalogError::Io {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Return the entry for `provider` on `platform`, if any.
    #[must_use]
    pub fn provider(&self, platform: &Platform, provider: &str) -> Option<&ProviderCatalog> {
        self.platforms
            .get(platform.as_str())
            .and_then(|providers| providers.get(provider))
    }

    /// Replace the entry for `provider` on `platform`.
    ///
    /// Entries for other platforms and providers are left untouched.
    pub fn set_provider(&mut self, platform: &Platform, provider: &str, entry: ProviderCatalog) {
        self.platforms
            .entry(platform.as_str().to_owned())
            .or_default()
            .insert(provider.to_owned(), entry);
    }

    /// Resolve a (provider, selector) pair to a distribution record.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] naming the first lookup that failed:
    /// platform, provider, alias, or major version.
    pub fn resolve(
        &self,
        platform: &Platform,
        provider: &str,
        selector: VersionSelector,
    ) -> Result<DistributionRecord> {
        let providers =
            self.platforms
                .get(platform.as_str())
                .ok_or_else(|| CatalogError::UnknownPlatform {
                    platform: platform.to_string(),
                })?;
        let entry = providers
            .get(provider)
            .ok_or_else(|| CatalogError::UnknownProvider {
                platform: platform.to_string(),
                provider: provider.to_owned(),
                available: providers.keys().cloned().collect::<Vec<_>>().join(", "),
            })?;
        let major = entry.resolve_major(provider, selector)?;
        let source = entry
            .versions
            .get(&major)
            .ok_or_else(|| CatalogError::UnknownVersion {
                provider: provider.to_owned(),
                major,
                available: entry.available_majors(),
            })?;
        log::debug!("resolved {provider} {selector} to {}", source.version);
        Ok(DistributionRecord::from_entry(provider, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const PLATFORM: &str = "x86_64-unknown-linux-gnu";

    fn entry(major: u32, version: &str) -> SourceEntry {
        SourceEntry {
            major_version: major,
            version: version.to_owned(),
            url: format!("https://example.test/jdk{major}.tar.gz"),
            sha256: crate::artefact::sha256_digest::Sha256Digest::try_from("c".repeat(64))
                .expect("valid"),
        }
    }

    #[fixture]
    fn platform() -> Platform {
        Platform::try_from(PLATFORM).expect("supported")
    }

    #[fixture]
    fn catalog(platform: Platform) -> Catalog {
        let mut adoptium = ProviderCatalog::default();
        adoptium.versions.insert(17, entry(17, "17.0.10+7"));
        adoptium.versions.insert(21, entry(21, "21.0.2+13"));
        adoptium.versions.insert(22, entry(22, "22+36"));
        adoptium.aliases.insert(RollingAlias::Latest, 22);
        adoptium.aliases.insert(RollingAlias::Stable, 22);
        adoptium.aliases.insert(RollingAlias::Lts, 21);

        let mut catalog = Catalog::default();
        catalog.set_provider(&platform, "adoptium", adoptium);
        catalog
    }

    #[rstest]
    #[case::latest("latest", "22+36")]
    #[case::stable("stable", "22+36")]
    #[case::lts("lts", "21.0.2+13")]
    #[case::major("17", "17.0.10+7")]
    fn resolves_selectors(
        catalog: Catalog,
        platform: Platform,
        #[case] selector: &str,
        #[case] version: &str,
    ) {
        let record = catalog
            .resolve(&platform, "adoptium", selector.parse().expect("selector"))
            .expect("resolves");
        assert_eq!(record.version, version);
        assert_eq!(record.provider, "adoptium");
    }

    #[rstest]
    fn alias_follows_table_updates(mut catalog: Catalog, platform: Platform) {
        let mut entry = catalog
            .provider(&platform, "adoptium")
            .cloned()
            .expect("provider present");
        entry.aliases.insert(RollingAlias::Lts, 17);
        catalog.set_provider(&platform, "adoptium", entry);

        let record = catalog
            .resolve(&platform, "adoptium", "lts".parse().expect("selector"))
            .expect("resolves");
        assert_eq!(record.major_version, 17);
    }

    #[rstest]
    fn unknown_provider_lists_available(catalog: Catalog, platform: Platform) {
        let err = catalog
            .resolve(&platform, "zulu", VersionSelector::Major(21))
            .expect_err("unknown provider");
        assert!(matches!(err, CatalogError::UnknownProvider { ref available, .. } if available == "adoptium"));
    }

    #[rstest]
    fn unknown_major_is_rejected(catalog: Catalog, platform: Platform) {
        let err = catalog
            .resolve(&platform, "adoptium", VersionSelector::Major(8))
            .expect_err("unknown major");
        assert!(matches!(err, CatalogError::UnknownVersion { major: 8, .. }));
    }

    #[rstest]
    fn dangling_alias_is_rejected(mut catalog: Catalog, platform: Platform) {
        let mut entry = catalog
            .provider(&platform, "adoptium")
            .cloned()
            .expect("provider present");
        entry.aliases.insert(RollingAlias::Latest, 23);
        catalog.set_provider(&platform, "adoptium", entry);

        let err = catalog
            .resolve(
                &platform,
                "adoptium",
                VersionSelector::Alias(RollingAlias::Latest),
            )
            .expect_err("dangling alias");
        assert!(matches!(err, CatalogError::UnknownVersion { major: 23, .. }));
    }

    #[rstest]
    fn missing_alias_is_rejected(platform: Platform) {
        let mut semeru = ProviderCatalog::default();
        semeru.versions.insert(21, entry(21, "21.0.2+13"));
        let mut catalog = Catalog::default();
        catalog.set_provider(&platform, "semeru", semeru);

        let err = catalog
            .resolve(&platform, "semeru", VersionSelector::Alias(RollingAlias::Lts))
            .expect_err("no alias");
        assert!(matches!(err, CatalogError::UnknownAlias { .. }));
    }

    #[rstest]
    fn unknown_platform_is_rejected(catalog: Catalog) {
        let other = Platform::try_from("aarch64-unknown-linux-gnu").expect("supported");
        let err = catalog
            .resolve(&other, "adoptium", VersionSelector::Major(21))
            .expect_err("unknown platform");
        assert!(matches!(err, CatalogError::UnknownPlatform { .. }));
    }

    #[rstest]
    fn json_round_trip_preserves_aliases(catalog: Catalog) {
        let json = catalog.to_json_pretty().expect("serialise");
        assert!(json.contains("\"lts\": 21"));
        let parsed = Catalog::from_json(&json).expect("parse");
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn malformed_digest_fails_to_parse() {
        let json = concat!(
            r#"{"x86_64-unknown-linux-gnu":{"adoptium":{"versions":{"#,
            r#""21":{"major_version":21,"version":"21","url":"u","sha256":"short"}}}}}"#,
        );
        let err = Catalog::from_json(json).expect_err("bad digest");
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = camino::Utf8PathBuf::try_from(temp.path().join("catalog.json"))
            .expect("UTF-8 path");
        let catalog = Catalog::load_or_default(&path).expect("empty catalog");
        assert_eq!(catalog, Catalog::default());
    }
}
