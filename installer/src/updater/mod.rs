//! Catalog regeneration from upstream provider APIs.
//!
//! For one provider and platform the updater asks which feature versions
//! exist, picks the newest build of each, and derives the rolling alias
//! table from the same answer. The result replaces that provider's entry in
//! the catalog file; other platforms and providers are left as they were.
//!
//! # Sub-modules
//!
//! - [`api`] — Wire types and the HTTP client.
//! - [`error`] — Updater error types.
//! - [`provider`] — Known providers and release channels.

pub mod api;
pub mod error;
pub mod provider;

use crate::artefact::platform::Platform;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::catalog::error::CatalogError;
use crate::catalog::record::SourceEntry;
use crate::catalog::selector::RollingAlias;
use crate::catalog::{Catalog, ProviderCatalog};
use api::{AvailableReleases, ProviderApi, Release};
use camino::Utf8Path;
use error::UpdateError;
use provider::{Provider, ReleaseType};
use std::collections::BTreeMap;

/// Build a fresh catalog entry for `provider` on `platform`.
///
/// # Errors
///
/// Returns an error if any general-availability query fails or yields no
/// usable build. A failed early-access query is fatal only when
/// [`Provider::ea_failure_is_fatal`] says so.
pub fn fetch_provider_catalog(
    api: &dyn ProviderApi,
    provider: Provider,
    platform: &Platform,
) -> Result<ProviderCatalog, UpdateError> {
    let available = api.available_releases()?;
    let mut versions = BTreeMap::new();
    for &major in &available.available_releases {
        let entry = newest_entry(api, provider, platform, major, ReleaseType::Ga)?;
        log::debug!("{provider} {major}: {}", entry.version);
        versions.insert(major, entry);
    }

    let tip = available.most_recent_feature_version;
    if !versions.contains_key(&tip) {
        match newest_entry(api, provider, platform, tip, ReleaseType::Ea) {
            Ok(entry) => {
                log::debug!("{provider} {tip} (ea): {}", entry.version);
                versions.insert(tip, entry);
            }
            Err(err) if provider.ea_failure_is_fatal() => return Err(err),
            Err(err) => log::warn!("skipping early-access JDK {tip} for {provider}: {err}"),
        }
    }

    let aliases = derive_aliases(&available, &versions);
    Ok(ProviderCatalog { versions, aliases })
}

/// Compute the alias table for a set of fetched versions.
///
/// Aliases whose target is not in `versions` are omitted.
#[must_use]
pub fn derive_aliases<V>(
    available: &AvailableReleases,
    versions: &BTreeMap<u32, V>,
) -> BTreeMap<RollingAlias, u32> {
    let mut aliases = BTreeMap::new();
    let latest = Some(available.most_recent_feature_version)
        .filter(|major| versions.contains_key(major))
        .or_else(|| versions.keys().next_back().copied());
    if let Some(latest) = latest {
        aliases.insert(RollingAlias::Latest, latest);
    }
    if versions.contains_key(&available.most_recent_feature_release) {
        aliases.insert(RollingAlias::Stable, available.most_recent_feature_release);
    }
    if let Some(&lts) = available
        .available_lts_releases
        .iter()
        .filter(|major| versions.contains_key(major))
        .max()
    {
        aliases.insert(RollingAlias::Lts, lts);
    }
    aliases
}

/// Regenerate `provider`'s entry for `platform` in the catalog at `path`.
///
/// The file is created, along with its parent directory, if it does not
/// exist yet.
///
/// # Errors
///
/// Returns an error if the provider cannot be queried or the catalog
/// cannot be read or written.
pub fn update_catalog(
    path: &Utf8Path,
    api: &dyn ProviderApi,
    provider: Provider,
    platform: &Platform,
) -> Result<ProviderCatalog, UpdateError> {
    let mut catalog = Catalog::load_or_default(path)?;
    let entry = fetch_provider_catalog(api, provider, platform)?;
    catalog.set_provider(platform, provider.as_str(), entry.clone());
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CatalogError::Io {
            path: parent.to_string(),
            reason: e.to_string(),
        })?;
    }
    catalog.save(path)?;
    log::info!(
        "updated {provider} for {platform}: {} versions",
        entry.versions.len()
    );
    Ok(entry)
}

fn newest_entry(
    api: &dyn ProviderApi,
    provider: Provider,
    platform: &Platform,
    major: u32,
    release_type: ReleaseType,
) -> Result<SourceEntry, UpdateError> {
    let releases = api.feature_releases(major, release_type, platform)?;
    let newest = newest_release(releases).ok_or_else(|| UpdateError::NoReleases {
        provider: provider.to_string(),
        major,
        release_type: release_type.to_string(),
    })?;
    let package = &newest
        .binaries
        .first()
        .ok_or_else(|| UpdateError::NoBinary {
            provider: provider.to_string(),
            major,
            platform: platform.to_string(),
        })?
        .package;
    let sha256 = Sha256Digest::try_from(package.checksum.to_ascii_lowercase()).map_err(|e| {
        UpdateError::InvalidChecksum {
            provider: provider.to_string(),
            major,
            reason: e.to_string(),
        }
    })?;
    Ok(SourceEntry {
        major_version: major,
        version: newest.version_data.version_string(),
        url: package.link.clone(),
        sha256,
    })
}

fn newest_release(releases: Vec<Release>) -> Option<Release> {
    releases
        .into_iter()
        .max_by_key(|release| release.version_data.sort_key())
}

#[cfg(test)]
#[path = "updater_tests.rs"]
mod tests;
