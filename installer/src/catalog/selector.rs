//! Version selectors: explicit major versions and rolling aliases.

use super::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A selector that names a release indirectly through the alias table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollingAlias {
    /// The newest feature version, early access included.
    Latest,
    /// The newest generally available feature release.
    Stable,
    /// The newest long-term-support release.
    Lts,
}

impl RollingAlias {
    /// Every alias, in display order.
    pub const ALL: [Self; 3] = [Self::Latest, Self::Stable, Self::Lts];

    /// Return the alias as it appears in the catalog and on the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Stable => "stable",
            Self::Lts => "lts",
        }
    }
}

impl fmt::Display for RollingAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caller picks a release for a provider.
///
/// # Examples
///
/// ```
/// use jdk_installer::catalog::selector::{RollingAlias, VersionSelector};
///
/// let major: VersionSelector = "17".parse().expect("major version");
/// assert_eq!(major, VersionSelector::Major(17));
///
/// let alias: VersionSelector = "LTS".parse().expect("alias");
/// assert_eq!(alias, VersionSelector::Alias(RollingAlias::Lts));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionSelector {
    /// An explicit major version such as `21`.
    Major(u32),
    /// A rolling alias resolved through the catalog's alias table.
    Alias(RollingAlias),
}

impl FromStr for VersionSelector {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let lower = trimmed.to_ascii_lowercase();
        if let Some(alias) = RollingAlias::ALL
            .into_iter()
            .find(|alias| alias.as_str() == lower)
        {
            return Ok(Self::Alias(alias));
        }
        match trimmed.parse::<u32>() {
            Ok(major) if major > 0 => Ok(Self::Major(major)),
            _ => Err(CatalogError::InvalidSelector {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major(major) => write!(f, "{major}"),
            Self::Alias(alias) => write!(f, "{alias}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::latest("latest", VersionSelector::Alias(RollingAlias::Latest))]
    #[case::stable("Stable", VersionSelector::Alias(RollingAlias::Stable))]
    #[case::lts(" lts ", VersionSelector::Alias(RollingAlias::Lts))]
    #[case::major("21", VersionSelector::Major(21))]
    #[case::legacy_major("8", VersionSelector::Major(8))]
    fn parses_selectors(#[case] input: &str, #[case] expected: VersionSelector) {
        assert_eq!(input.parse::<VersionSelector>().expect("valid"), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::zero("0")]
    #[case::dotted("21.0.2")]
    #[case::word("newest")]
    fn rejects_invalid_selectors(#[case] input: &str) {
        let err = input.parse::<VersionSelector>().expect_err("invalid");
        assert!(matches!(err, CatalogError::InvalidSelector { .. }));
    }

    #[test]
    fn alias_round_trips_through_display() {
        for alias in RollingAlias::ALL {
            let parsed: VersionSelector = alias.to_string().parse().expect("valid");
            assert_eq!(parsed, VersionSelector::Alias(alias));
        }
    }
}
