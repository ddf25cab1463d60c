//! Output formatting for the installer CLI.
//!
//! Progress and results are written to an injected `&mut dyn Write` (stderr
//! in the binary, a `Vec<u8>` in tests). Diagnostic detail goes through the
//! `log` facade instead.

use crate::catalog::record::DistributionRecord;
use crate::error::{InstallerError, Result};
use crate::relocation::RelocationReport;
use crate::wrapper::WrapReport;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort progress output.
    }
}

/// Write one line to `out`, reporting failures.
///
/// # Errors
///
/// Returns [`InstallerError::WriteFailed`] if the write fails.
pub fn write_line(out: &mut dyn Write, message: impl Display) -> Result<()> {
    writeln!(out, "{message}").map_err(|source| InstallerError::WriteFailed { source })
}

/// Format a success message after installation.
#[must_use]
pub fn success_message(record: &DistributionRecord, destination: &Utf8Path) -> String {
    format!(
        "Installed {} {} to {destination}",
        record.provider, record.version
    )
}

/// Summarise what relocation and wrapping changed.
#[must_use]
pub fn finalize_summary(relocation: &RelocationReport, wrap: &WrapReport) -> String {
    let count = |n: usize, singular: &str, plural: &str| {
        format!("{n} {}", if n == 1 { singular } else { plural })
    };
    format!(
        "Wrapped {}, removed {}, patched {}",
        count(wrap.wrapped.len(), "executable", "executables"),
        count(relocation.removed.len(), "path", "paths"),
        count(relocation.patched.len(), "library", "libraries"),
    )
}

/// Human-readable description of a resolved record.
#[must_use]
pub fn record_text(record: &DistributionRecord) -> String {
    format!(
        concat!(
            "provider: {}\n",
            "major:    {}\n",
            "version:  {}\n",
            "url:      {}\n",
            "sha256:   {}",
        ),
        record.provider, record.major_version, record.version, record.url, record.sha256
    )
}

/// Settings shown by `install --dry-run`.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use jdk_installer::artefact::sha256_digest::Sha256Digest;
/// use jdk_installer::catalog::record::DistributionRecord;
/// use jdk_installer::output::DryRunInfo;
///
/// let record = DistributionRecord {
///     provider: "adoptium".to_owned(),
///     major_version: 21,
///     version: "21.0.2+13".to_owned(),
///     url: "https://example.test/jdk.tar.gz".to_owned(),
///     sha256: Sha256Digest::try_from("a".repeat(64)).expect("valid"),
/// };
/// let info = DryRunInfo {
///     platform: "x86_64-unknown-linux-gnu",
///     record: &record,
///     destination: Utf8Path::new("/opt/jdk-21"),
///     config_path: None,
/// };
/// assert!(info.display_text().contains("Dry run"));
/// ```
#[derive(Debug)]
pub struct DryRunInfo<'a> {
    /// Target platform triple.
    pub platform: &'a str,
    /// The resolved distribution.
    pub record: &'a DistributionRecord,
    /// Where the installation would be published.
    pub destination: &'a Utf8Path,
    /// The configuration file in use, if any.
    pub config_path: Option<&'a Utf8Path>,
}

impl DryRunInfo<'_> {
    /// Format the dry-run information for display.
    #[must_use]
    pub fn display_text(&self) -> String {
        [
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Platform: {}", self.platform),
            format!(
                "Distribution: {} {}",
                self.record.provider, self.record.version
            ),
            format!("Archive: {}", self.record.url),
            format!("Expected SHA-256: {}", self.record.sha256),
            format!("Destination: {}", self.destination),
            format!(
                "Configuration: {}",
                self.config_path.map_or("built-in defaults", Utf8Path::as_str)
            ),
        ]
        .join("\n")
    }
}
