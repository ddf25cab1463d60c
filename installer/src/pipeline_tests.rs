//! Unit tests for the install and finalize pipelines.
//!
//! Archives are built on the fly from a synthetic JDK tree and served
//! through `file://` URLs, so the real downloader, verifier, and extractor
//! run end to end. ELF work goes through `FakeElfPatcher`.

use super::{Fetchers, PipelineContext, STAGING_PREFIX, finalize, install};
use crate::artefact::download::{DownloadError, HttpDownloader, MockArchiveDownloader};
use crate::artefact::extraction::{MockArchiveExtractor, TarExtractor};
use crate::artefact::platform::Platform;
use crate::artefact::sha256_digest::Sha256Digest;
use crate::artefact::verification::{VerificationError, compute_sha256};
use crate::catalog::record::DistributionRecord;
use crate::config::{Config, RuntimeDependency};
use crate::error::InstallerError;
use crate::metadata::{MANIFEST_FILE, read_manifest};
use crate::relocation::find;
use crate::test_utils::{FakeElfPatcher, JdkTreeBuilder, write_jdk_archive};
use camino::{Utf8Path, Utf8PathBuf};
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use tempfile::TempDir;

const TOP_LEVEL: &str = "jdk-21.0.2+13";

struct Harness {
    _temp: TempDir,
    base: Utf8PathBuf,
    platform: Platform,
    config: Config,
    patcher: FakeElfPatcher,
}

impl Harness {
    fn context(&self, quiet: bool) -> PipelineContext<'_> {
        PipelineContext {
            platform: &self.platform,
            config: &self.config,
            patcher: &self.patcher,
            quiet,
        }
    }

    fn archive(&self, configure: impl FnOnce(JdkTreeBuilder) -> JdkTreeBuilder) -> DistributionRecord {
        let archive = self.base.join("OpenJDK21U-jdk_x64_linux_hotspot.tar.gz");
        write_jdk_archive(&archive, TOP_LEVEL, configure);
        let sha256 = compute_sha256(archive.as_std_path()).expect("hash archive");
        DistributionRecord {
            provider: "adoptium".to_owned(),
            major_version: 21,
            version: "21.0.2+13".to_owned(),
            url: format!("file://{archive}"),
            sha256,
        }
    }

    fn destination(&self) -> Utf8PathBuf {
        self.base.join("out").join("jdk-21")
    }

    fn staging_leftovers(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.base.join("out")) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(STAGING_PREFIX))
            .collect()
    }
}

#[fixture]
fn harness() -> Harness {
    let temp = TempDir::new().expect("temp dir");
    let base = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("UTF-8 temp dir");
    let mut config = Config::default();
    config.runtime.dependencies.push(RuntimeDependency {
        name: "libX11".to_owned(),
        lib_dir: Utf8PathBuf::from("/deps/libX11/lib"),
    });
    Harness {
        _temp: temp,
        base,
        platform: Platform::try_from("x86_64-unknown-linux-gnu").expect("supported"),
        config,
        patcher: FakeElfPatcher::default(),
    }
}

fn real_fetchers<'a>(downloader: &'a HttpDownloader, extractor: &'a TarExtractor) -> Fetchers<'a> {
    Fetchers {
        downloader,
        extractor,
    }
}

/// Map every path under `root` to its contents or link target.
fn snapshot(root: &Utf8Path) -> BTreeMap<Utf8PathBuf, String> {
    find(root, "**/*")
        .expect("list tree")
        .into_iter()
        .map(|path| {
            let meta = path.symlink_metadata().expect("metadata");
            let value = if meta.file_type().is_symlink() {
                format!("link:{}", std::fs::read_link(&path).expect("link").display())
            } else if meta.is_dir() {
                "dir".to_owned()
            } else {
                String::from_utf8_lossy(&std::fs::read(&path).expect("read")).into_owned()
            };
            (path.strip_prefix(root).expect("inside root").to_owned(), value)
        })
        .collect()
}

#[rstest]
fn install_publishes_a_relocated_tree(harness: Harness) {
    let record = harness.archive(|tree| tree);
    let destination = harness.destination();
    let (downloader, extractor) = (HttpDownloader::default(), TarExtractor);
    let mut stderr = Vec::new();

    let installation = install(
        &harness.context(false),
        &real_fetchers(&downloader, &extractor),
        &record,
        &destination,
        &mut stderr,
    )
    .expect("install succeeds");

    assert_eq!(installation.destination, destination);
    assert!(destination.join("bin/.java-wrapped").is_file());
    assert!(destination.join("release").is_file());
    assert!(!destination.join(TOP_LEVEL).exists());
    assert!(
        std::fs::read_to_string(destination.join("bin/java"))
            .expect("launcher")
            .contains("/deps/libX11/lib")
    );
    assert!(
        std::fs::read_to_string(destination.join("nix-support/setup-hook"))
            .expect("hook")
            .contains(destination.as_str())
    );
    let manifest =
        read_manifest(&destination.join("nix-support").join(MANIFEST_FILE)).expect("manifest");
    assert_eq!(
        manifest.record.map(|r| r.version).as_deref(),
        Some("21.0.2+13")
    );
    assert!(manifest.removed.contains(Utf8Path::new("lib/libfreetype.so")));
    assert!(harness.staging_leftovers().is_empty());

    let progress = String::from_utf8_lossy(&stderr);
    assert!(progress.contains("Verifying checksum"));
    assert!(progress.contains("Publishing"));
}

#[rstest]
fn checksum_mismatch_fails_before_extraction(harness: Harness) {
    let mut record = harness.archive(|tree| tree);
    record.sha256 = Sha256Digest::try_from("0".repeat(64)).expect("valid digest");
    let downloader = HttpDownloader::default();
    let mut extractor = MockArchiveExtractor::new();
    extractor.expect_extract().never();

    let err = install(
        &harness.context(true),
        &Fetchers {
            downloader: &downloader,
            extractor: &extractor,
        },
        &record,
        &harness.destination(),
        &mut Vec::new(),
    )
    .expect_err("checksum mismatch");

    assert!(matches!(
        err,
        InstallerError::Verification(VerificationError::ChecksumMismatch { .. })
    ));
    assert!(!harness.destination().exists());
    assert!(harness.staging_leftovers().is_empty());
}

#[rstest]
fn layout_drift_leaves_no_destination(harness: Harness) {
    let record = harness.archive(JdkTreeBuilder::without_font_manager);
    let (downloader, extractor) = (HttpDownloader::default(), TarExtractor);

    let err = install(
        &harness.context(true),
        &real_fetchers(&downloader, &extractor),
        &record,
        &harness.destination(),
        &mut Vec::new(),
    )
    .expect_err("layout drift");

    assert!(matches!(err, InstallerError::LayoutDrift { .. }));
    assert!(!harness.destination().exists());
    assert!(harness.staging_leftovers().is_empty());
}

#[rstest]
fn existing_destination_is_rejected_before_download(harness: Harness) {
    let record = harness.archive(|tree| tree);
    let destination = harness.destination();
    std::fs::create_dir_all(&destination).expect("occupy destination");
    let mut downloader = MockArchiveDownloader::new();
    downloader.expect_download().never();

    let err = install(
        &harness.context(true),
        &Fetchers {
            downloader: &downloader,
            extractor: &TarExtractor,
        },
        &record,
        &destination,
        &mut Vec::new(),
    )
    .expect_err("destination exists");

    assert!(matches!(err, InstallerError::DestinationExists { .. }));
}

#[rstest]
fn download_failure_is_reported(harness: Harness) {
    let record = harness.archive(|tree| tree);
    let mut downloader = MockArchiveDownloader::new();
    downloader
        .expect_download()
        .times(1)
        .returning(|url, _| {
            Err(DownloadError::NotFound {
                url: url.to_owned(),
            })
        });

    let err = install(
        &harness.context(true),
        &Fetchers {
            downloader: &downloader,
            extractor: &TarExtractor,
        },
        &record,
        &harness.destination(),
        &mut Vec::new(),
    )
    .expect_err("download fails");

    assert!(matches!(err, InstallerError::Download(DownloadError::NotFound { .. })));
    assert!(!harness.destination().exists());
}

#[rstest]
fn quiet_mode_suppresses_progress(harness: Harness) {
    let record = harness.archive(|tree| tree);
    let (downloader, extractor) = (HttpDownloader::default(), TarExtractor);
    let mut stderr = Vec::new();

    install(
        &harness.context(true),
        &real_fetchers(&downloader, &extractor),
        &record,
        &harness.destination(),
        &mut stderr,
    )
    .expect("install succeeds");

    assert!(stderr.is_empty());
}

#[rstest]
fn finalize_twice_yields_identical_trees(harness: Harness) {
    let root = harness.base.join("jdk");
    JdkTreeBuilder::new(&root).build();

    let first = finalize(&harness.context(true), &root, None, &mut Vec::new())
        .expect("first finalize");
    let after_first = snapshot(&root);
    let second = finalize(&harness.context(true), &root, None, &mut Vec::new())
        .expect("second finalize");

    assert_eq!(snapshot(&root), after_first);
    assert_eq!(first.manifest, second.manifest);
    assert!(second.wrap.wrapped.is_empty());
    assert!(!root.join("bin/..java-wrapped-wrapped").exists());
}

#[rstest]
fn finalize_records_explicit_home(harness: Harness) {
    let root = harness.base.join("jdk");
    JdkTreeBuilder::new(&root).build();

    let outcome = finalize(
        &harness.context(true),
        &root,
        Some(Utf8Path::new("/opt/java/21")),
        &mut Vec::new(),
    )
    .expect("finalize succeeds");

    assert_eq!(outcome.manifest.home, Utf8PathBuf::from("/opt/java/21"));
    assert!(
        std::fs::read_to_string(root.join("nix-support/setup-hook"))
            .expect("hook")
            .contains("'/opt/java/21'")
    );
}

#[rstest]
fn finalize_rejects_missing_directory(harness: Harness) {
    let err = finalize(
        &harness.context(true),
        &harness.base.join("absent"),
        None,
        &mut Vec::new(),
    )
    .expect_err("missing root");
    assert!(matches!(err, InstallerError::LayoutDrift { .. }));
}
