//! Upstream providers the catalog can be regenerated from.

use super::error::UpdateError;
use std::fmt;
use std::str::FromStr;

/// A provider exposing the Adoptium-style v3 release API.
///
/// # Examples
///
/// ```
/// use jdk_installer::updater::provider::Provider;
///
/// let provider: Provider = "semeru".parse().expect("known provider");
/// assert_eq!(provider.jvm_impl(), Some("openj9"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Eclipse Temurin builds.
    Adoptium,
    /// IBM Semeru builds with the OpenJ9 VM.
    Semeru,
}

impl Provider {
    /// Catalog key for this provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Adoptium => "adoptium",
            Self::Semeru => "semeru",
        }
    }

    /// Root of the provider's API.
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Adoptium => "https://api.adoptium.net",
            Self::Semeru => "https://api.adoptopenjdk.net",
        }
    }

    /// Value of the `jvm_impl` query parameter sent with every request.
    #[must_use]
    pub const fn jvm_impl(self) -> Option<&'static str> {
        match self {
            Self::Adoptium => None,
            Self::Semeru => Some("openj9"),
        }
    }

    /// Whether failing to fetch an early-access build aborts the update.
    ///
    /// Semeru frequently lags behind the newest feature version, so a
    /// missing early-access build there only produces a warning.
    #[must_use]
    pub const fn ea_failure_is_fatal(self) -> bool {
        matches!(self, Self::Adoptium)
    }
}

impl FromStr for Provider {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adoptium" => Ok(Self::Adoptium),
            "semeru" => Ok(Self::Semeru),
            other => Err(UpdateError::UnknownProvider {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Release channel queried for a feature version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseType {
    /// General availability.
    Ga,
    /// Early access.
    Ea,
}

impl ReleaseType {
    /// Path segment used by the API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ga => "ga",
            Self::Ea => "ea",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
