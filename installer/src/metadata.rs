//! Environment-activation metadata written into the installation.
//!
//! Three files land in the support directory (`nix-support/` by default):
//!
//! - `propagated-build-inputs`: companion packages, space separated.
//! - `setup-hook`: a shell fragment exporting the home variable unless the
//!   caller already set it.
//! - `jdk-install.json`: a manifest of what the installer did.

use crate::catalog::record::DistributionRecord;
use crate::config::ActivationConfig;
use crate::error::{InstallerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// File listing propagated companion packages.
pub const PROPAGATED_INPUTS_FILE: &str = "propagated-build-inputs";
/// Shell fragment exporting the home variable.
pub const SETUP_HOOK_FILE: &str = "setup-hook";
/// JSON install manifest.
pub const MANIFEST_FILE: &str = "jdk-install.json";

/// Record of what the installer did to a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    /// The distribution installed, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<ManifestRecord>,
    /// Platform the tree was relocated for.
    pub platform: String,
    /// Final location of the installation.
    pub home: Utf8PathBuf,
    /// Wrapped executables, relative to the root.
    pub wrapped: BTreeSet<Utf8PathBuf>,
    /// Removed paths, relative to the root.
    pub removed: BTreeSet<Utf8PathBuf>,
    /// Whether binaries were stripped. Always `false`.
    pub strip: bool,
}

/// The distribution fields stored in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Provider identifier.
    pub provider: String,
    /// Feature release number.
    pub major_version: u32,
    /// Full version string.
    pub version: String,
    /// Download URL.
    pub url: String,
    /// Verified archive digest.
    pub sha256: String,
}

impl From<&DistributionRecord> for ManifestRecord {
    fn from(record: &DistributionRecord) -> Self {
        Self {
            provider: record.provider.clone(),
            major_version: record.major_version,
            version: record.version.clone(),
            url: record.url.clone(),
            sha256: record.sha256.as_str().to_owned(),
        }
    }
}

impl InstallManifest {
    /// Fold an earlier manifest into this one.
    ///
    /// Paths accumulate across runs and an unknown record is taken from the
    /// earlier manifest, so re-finalizing a tree reproduces the same file.
    pub fn merge_previous(&mut self, previous: Self) {
        self.wrapped.extend(previous.wrapped);
        self.removed.extend(previous.removed);
        if self.record.is_none() {
            self.record = previous.record;
        }
    }
}

/// Render the setup hook for `home`.
///
/// # Errors
///
/// Returns [`InstallerError::InvalidHomeVariable`] unless `variable` is a
/// shell identifier.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use jdk_installer::metadata::setup_hook;
///
/// let hook = setup_hook("JAVA_HOME", Utf8Path::new("/opt/jdk-21")).expect("valid");
/// assert_eq!(
///     hook,
///     "if [ -z \"${JAVA_HOME-}\" ]; then export JAVA_HOME='/opt/jdk-21'; fi\n"
/// );
/// ```
pub fn setup_hook(variable: &str, home: &Utf8Path) -> Result<String> {
    if !is_shell_identifier(variable) {
        return Err(InstallerError::InvalidHomeVariable {
            name: variable.to_owned(),
        });
    }
    let quoted = format!("'{}'", home.as_str().replace('\'', r"'\''"));
    Ok(format!(
        "if [ -z \"${{{variable}-}}\" ]; then export {variable}={quoted}; fi\n"
    ))
}

fn is_shell_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Write the propagated inputs file and the setup hook.
///
/// Returns the support directory.
///
/// # Errors
///
/// Returns an error if the home variable is invalid or a file cannot be
/// written.
pub fn write_activation(
    root: &Utf8Path,
    home: &Utf8Path,
    activation: &ActivationConfig,
) -> Result<Utf8PathBuf> {
    let hook = setup_hook(&activation.home_variable, home)?;
    let support = root.join(&activation.support_dir);
    std::fs::create_dir_all(&support)?;

    let inputs = if activation.propagated_inputs.is_empty() {
        String::new()
    } else {
        format!("{}\n", activation.propagated_inputs.join(" "))
    };
    std::fs::write(support.join(PROPAGATED_INPUTS_FILE), inputs)?;
    std::fs::write(support.join(SETUP_HOOK_FILE), hook)?;
    log::debug!("wrote activation metadata to {support}");
    Ok(support)
}

/// Write `manifest` to the support directory, merging any earlier one.
///
/// An unreadable earlier manifest is replaced.
///
/// # Errors
///
/// Returns an error if the manifest cannot be serialised or written.
pub fn write_manifest(support: &Utf8Path, mut manifest: InstallManifest) -> Result<InstallManifest> {
    let path = support.join(MANIFEST_FILE);
    if let Some(previous) = read_manifest(&path) {
        manifest.merge_previous(previous);
    }
    let mut json = serde_json::to_string_pretty(&manifest).map_err(std::io::Error::other)?;
    json.push('\n');
    std::fs::write(&path, json)?;
    Ok(manifest)
}

/// Read the manifest at `path`, if it exists and parses.
#[must_use]
pub fn read_manifest(path: &Utf8Path) -> Option<InstallManifest> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            log::warn!("ignoring unreadable manifest {path}: {e}");
            None
        }
    }
}
