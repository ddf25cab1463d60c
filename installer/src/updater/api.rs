//! Client for the Adoptium-style v3 release API.
//!
//! Only the fields the updater reads are modelled; everything else in the
//! responses is ignored.

use super::error::UpdateError;
use super::provider::{Provider, ReleaseType};
use crate::artefact::download::http_agent;
use crate::artefact::platform::Platform;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Response of `/v3/info/available_releases`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AvailableReleases {
    /// Feature versions designated long-term support.
    #[serde(default)]
    pub available_lts_releases: Vec<u32>,
    /// Feature versions with general-availability builds.
    #[serde(default)]
    pub available_releases: Vec<u32>,
    /// Newest feature version with a general-availability build.
    pub most_recent_feature_release: u32,
    /// Newest feature version, possibly only in early access.
    pub most_recent_feature_version: u32,
}

/// One release from `/v3/assets/feature_releases`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Downloadable binaries matching the query.
    #[serde(default)]
    pub binaries: Vec<Binary>,
    /// Structured version of the release.
    pub version_data: VersionData,
}

/// A binary attached to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Binary {
    /// The archive itself.
    pub package: Package,
}

/// An archive attached to a [`Binary`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Download URL.
    pub link: String,
    /// Hex SHA-256 of the archive.
    pub checksum: String,
}

/// Version numbers of a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionData {
    /// Feature version.
    pub major: u32,
    /// Interim version.
    #[serde(default)]
    pub minor: u32,
    /// Update version.
    #[serde(default)]
    pub security: u32,
    /// Build number.
    #[serde(default)]
    pub build: u32,
    /// Semantic version string, e.g. `21.0.2+13`.
    #[serde(default)]
    pub semver: Option<String>,
}

impl VersionData {
    /// Key releases are ordered by.
    #[must_use]
    pub const fn sort_key(&self) -> (u32, u32, u32, u32) {
        (self.major, self.minor, self.security, self.build)
    }

    /// Version string recorded in the catalog.
    #[must_use]
    pub fn version_string(&self) -> String {
        match &self.semver {
            Some(semver) if !semver.is_empty() => semver.clone(),
            _ => format!(
                "{}.{}.{}+{}",
                self.major, self.minor, self.security, self.build
            ),
        }
    }
}

/// Source of release information for one provider.
#[cfg_attr(test, mockall::automock)]
pub trait ProviderApi {
    /// Fetch the list of available feature versions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    fn available_releases(&self) -> Result<AvailableReleases, UpdateError>;

    /// Fetch the releases of feature version `major` on `platform`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    fn feature_releases(
        &self,
        major: u32,
        release_type: ReleaseType,
        platform: &Platform,
    ) -> Result<Vec<Release>, UpdateError>;
}

/// [`ProviderApi`] over HTTP.
pub struct HttpProviderApi {
    agent: ureq::Agent,
    provider: Provider,
    base_url: String,
}

impl HttpProviderApi {
    /// Create a client for `provider` with a whole-request timeout.
    #[must_use]
    pub fn new(provider: Provider, timeout: Duration) -> Self {
        Self {
            agent: http_agent(timeout),
            provider,
            base_url: provider.default_base_url().to_owned(),
        }
    }

    /// Send requests to `base_url` instead of the provider's public API.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpdateError> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("querying {url}");
        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        if let Some(jvm_impl) = self.provider.jvm_impl() {
            request = request.query("jvm_impl", jvm_impl);
        }
        let http_error = |reason: String| UpdateError::Http {
            url: url.clone(),
            reason,
        };
        let mut response = request.call().map_err(|e| http_error(e.to_string()))?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| http_error(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| UpdateError::Decode {
            url: url.clone(),
            reason: e.to_string(),
        })
    }
}

impl ProviderApi for HttpProviderApi {
    fn available_releases(&self) -> Result<AvailableReleases, UpdateError> {
        self.get_json("/v3/info/available_releases", &[])
    }

    fn feature_releases(
        &self,
        major: u32,
        release_type: ReleaseType,
        platform: &Platform,
    ) -> Result<Vec<Release>, UpdateError> {
        let path = format!("/v3/assets/feature_releases/{major}/{release_type}");
        self.get_json(
            &path,
            &[
                ("architecture", platform.api_architecture()),
                ("heap_size", "normal"),
                ("image_type", "jdk"),
                ("os", platform.api_os()),
                ("page_size", "10"),
                ("project", "jdk"),
            ],
        )
    }
}
