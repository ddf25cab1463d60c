//! Install and finalize pipelines.
//!
//! `install` runs every stage: fetch, verify, extract, relocate, wrap, emit
//! metadata, publish. All work happens in a staging directory next to the
//! destination and the finished tree is published with a single rename, so
//! a failure at any stage leaves nothing at the destination.
//!
//! `finalize` runs relocate, wrap, and emit in place on a tree that is
//! already unpacked. It is safe to run more than once.

use crate::artefact::download::ArchiveDownloader;
use crate::artefact::extraction::{ArchiveExtractor, archive_root};
use crate::artefact::platform::Platform;
use crate::artefact::verification::verify_archive;
use crate::catalog::record::DistributionRecord;
use crate::config::Config;
use crate::elf::ElfPatcher;
use crate::error::{InstallerError, Result};
use crate::metadata::{InstallManifest, ManifestRecord, write_activation, write_manifest};
use crate::output::write_stderr_line;
use crate::relocation::{RelocationReport, relocate};
use crate::wrapper::{WrapReport, wrap_executables};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;

/// Prefix of staging directories created beside the destination.
pub const STAGING_PREFIX: &str = ".jdk-install-";

/// Inputs shared by both pipelines.
pub struct PipelineContext<'a> {
    /// Platform whose header layout and conventions apply.
    pub platform: &'a Platform,
    /// Loaded configuration.
    pub config: &'a Config,
    /// ELF inspection and patching backend.
    pub patcher: &'a dyn ElfPatcher,
    /// Suppress progress output.
    pub quiet: bool,
}

/// Fetch and extraction backends used by [`install`].
pub struct Fetchers<'a> {
    /// Archive downloader.
    pub downloader: &'a dyn ArchiveDownloader,
    /// Archive extractor.
    pub extractor: &'a dyn ArchiveExtractor,
}

/// The result of relocating, wrapping, and emitting metadata for a tree.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    /// Changes made by relocation.
    pub relocation: RelocationReport,
    /// Changes made by wrapping.
    pub wrap: WrapReport,
    /// The manifest as written.
    pub manifest: InstallManifest,
}

/// A published installation.
#[derive(Debug, Clone)]
pub struct Installation {
    /// Where the tree now lives.
    pub destination: Utf8PathBuf,
    /// What was done to it.
    pub outcome: FinalizeOutcome,
}

/// Install `record` at `destination`.
///
/// # Errors
///
/// Returns [`InstallerError::DestinationExists`] if `destination` is
/// occupied, a verification error if the archive digest does not match,
/// and any error raised by a later stage. On error nothing is created at
/// `destination`.
pub fn install(
    context: &PipelineContext<'_>,
    fetchers: &Fetchers<'_>,
    record: &DistributionRecord,
    destination: &Utf8Path,
    stderr: &mut dyn Write,
) -> Result<Installation> {
    let destination = absolute(destination)?;
    ensure_vacant(&destination)?;
    let parent = destination
        .parent()
        .map_or_else(|| Utf8PathBuf::from("."), Utf8Path::to_owned);
    std::fs::create_dir_all(&parent)?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&parent)?;
    let staging_path = utf8(staging.path())?;
    log::debug!("staging {} in {staging_path}", record.install_dir_name());

    let archive = staging_path.join(record.archive_file_name());
    progress(context, stderr, format!("Downloading {}...", record.url));
    fetchers
        .downloader
        .download(&record.url, archive.as_std_path())?;

    progress(context, stderr, "Verifying checksum...");
    verify_archive(archive.as_std_path(), &record.sha256)?;

    progress(context, stderr, "Extracting archive...");
    let unpack = staging_path.join("unpack");
    std::fs::create_dir(&unpack)?;
    fetchers
        .extractor
        .extract(archive.as_std_path(), unpack.as_std_path())?;
    std::fs::remove_file(&archive)?;
    let root = utf8(&archive_root(unpack.as_std_path())?)?;

    progress(context, stderr, "Relocating and wrapping executables...");
    let outcome = finalize_tree(context, &root, &destination, Some(record))?;

    progress(context, stderr, format!("Publishing to {destination}..."));
    ensure_vacant(&destination)?;
    std::fs::rename(&root, &destination)?;
    drop(staging);

    Ok(Installation {
        destination,
        outcome,
    })
}

/// Relocate, wrap, and emit metadata for the tree at `root` in place.
///
/// `home` is the path recorded in the setup hook; it defaults to `root`.
///
/// # Errors
///
/// Returns [`InstallerError::LayoutDrift`] if `root` is not a JDK tree the
/// relocation rules understand, and propagates patching and I/O errors.
pub fn finalize(
    context: &PipelineContext<'_>,
    root: &Utf8Path,
    home: Option<&Utf8Path>,
    stderr: &mut dyn Write,
) -> Result<FinalizeOutcome> {
    if !root.is_dir() {
        return Err(InstallerError::LayoutDrift {
            reason: format!("{root} is not a directory"),
        });
    }
    let root = absolute(root)?;
    let home = match home {
        Some(home) => home.to_owned(),
        None => root.clone(),
    };
    progress(context, stderr, format!("Finalizing {root}..."));
    finalize_tree(context, &root, &home, None)
}

fn finalize_tree(
    context: &PipelineContext<'_>,
    root: &Utf8Path,
    home: &Utf8Path,
    record: Option<&DistributionRecord>,
) -> Result<FinalizeOutcome> {
    let config = context.config;
    let relocation = relocate(
        root,
        context.platform,
        &config.relocation,
        &config.runtime,
        context.patcher,
    )?;
    let wrap = wrap_executables(
        root,
        &config.relocation.helper,
        &config.runtime,
        context.patcher,
    )?;
    let support = write_activation(root, home, &config.activation)?;

    let relative = |path: &Utf8PathBuf| {
        path.strip_prefix(root)
            .map_or_else(|_| path.clone(), Utf8Path::to_owned)
    };
    let manifest = InstallManifest {
        record: record.map(ManifestRecord::from),
        platform: context.platform.to_string(),
        home: home.to_owned(),
        wrapped: wrap
            .wrapped
            .iter()
            .chain(&wrap.already_wrapped)
            .map(relative)
            .collect(),
        removed: relocation.removed.iter().cloned().collect(),
        strip: false,
    };
    let manifest = write_manifest(&support, manifest)?;

    Ok(FinalizeOutcome {
        relocation,
        wrap,
        manifest,
    })
}

fn ensure_vacant(destination: &Utf8Path) -> Result<()> {
    if destination.symlink_metadata().is_ok() {
        return Err(InstallerError::DestinationExists {
            path: destination.to_owned(),
        });
    }
    Ok(())
}

fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf> {
    utf8(&std::path::absolute(path)?)
}

fn utf8(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).map_err(|p| InstallerError::non_utf8(&p))
}

fn progress(context: &PipelineContext<'_>, stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if !context.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
