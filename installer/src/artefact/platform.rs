//! Target platform validation for JDK distribution lookup.
//!
//! Only Linux triples with prebuilt vendor archives are accepted. Each
//! supported triple also knows the names the provider APIs use for it and
//! the directory the JDK keeps its platform-specific JNI headers in.

use super::error::{ArtefactError, Result};
use serde::Serialize;
use std::fmt;

/// A supported triple with its provider-facing names.
struct PlatformInfo {
    triple: &'static str,
    api_arch: &'static str,
    api_os: &'static str,
    header_dir: &'static str,
}

const SUPPORTED_PLATFORMS: &[PlatformInfo] = &[
    PlatformInfo {
        triple: "x86_64-unknown-linux-gnu",
        api_arch: "x64",
        api_os: "linux",
        header_dir: "linux",
    },
    PlatformInfo {
        triple: "aarch64-unknown-linux-gnu",
        api_arch: "aarch64",
        api_os: "linux",
        header_dir: "linux",
    },
    PlatformInfo {
        triple: "powerpc64le-unknown-linux-gnu",
        api_arch: "ppc64le",
        api_os: "linux",
        header_dir: "linux",
    },
];

/// A validated target triple from the supported set.
///
/// # Examples
///
/// ```
/// use jdk_installer::artefact::platform::Platform;
///
/// let platform = Platform::try_from("x86_64-unknown-linux-gnu").expect("supported");
/// assert_eq!(platform.api_architecture(), "x64");
/// assert_eq!(platform.header_dir(), "linux");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Platform(String);

impl Platform {
    /// Return the triple as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the full list of supported target triples.
    #[must_use]
    pub fn supported() -> Vec<&'static str> {
        SUPPORTED_PLATFORMS.iter().map(|info| info.triple).collect()
    }

    /// Return the platform this binary was compiled for, if supported.
    #[must_use]
    pub fn host() -> Option<Self> {
        let triple = host_triple(
            std::env::consts::ARCH,
            std::env::consts::OS,
            cfg!(target_endian = "little"),
        )?;
        Self::try_from(triple).ok()
    }

    /// Architecture name used by the Adoptium-style release APIs.
    #[must_use]
    pub fn api_architecture(&self) -> &'static str {
        self.info().map_or("", |info| info.api_arch)
    }

    /// Operating system name used by the Adoptium-style release APIs.
    #[must_use]
    pub fn api_os(&self) -> &'static str {
        self.info().map_or("", |info| info.api_os)
    }

    /// Subdirectory of `include/` holding the platform JNI headers.
    #[must_use]
    pub fn header_dir(&self) -> &'static str {
        self.info().map_or("", |info| info.header_dir)
    }

    fn info(&self) -> Option<&'static PlatformInfo> {
        SUPPORTED_PLATFORMS.iter().find(|info| info.triple == self.0)
    }
}

impl TryFrom<&str> for Platform {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        if SUPPORTED_PLATFORMS.iter().any(|info| info.triple == value) {
            Ok(Self(value.to_owned()))
        } else {
            Err(ArtefactError::UnsupportedPlatform {
                value: value.to_owned(),
                expected: Self::supported().join(", "),
            })
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = ArtefactError;

    fn from_str(value: &str) -> Result<Self> {
        Self::try_from(value)
    }
}

impl AsRef<str> for Platform {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Triple for an architecture/OS pair; big-endian POWER is unsupported.
fn host_triple(arch: &str, os: &str, little_endian: bool) -> Option<&'static str> {
    match (arch, os) {
        ("x86_64", "linux") => Some("x86_64-unknown-linux-gnu"),
        ("aarch64", "linux") => Some("aarch64-unknown-linux-gnu"),
        ("powerpc64", "linux") if little_endian => Some("powerpc64le-unknown-linux-gnu"),
        _ => None,
    }
}
