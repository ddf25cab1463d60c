//! Test support utilities for installer behavioural tests.
//!
//! Every suite works inside a scratch directory and targets the x86-64
//! Linux platform, whose header directory is `include/linux`.

use camino::Utf8PathBuf;
use jdk_installer::artefact::platform::Platform;
use tempfile::TempDir;

/// A scratch directory that is removed when dropped.
pub struct Scratch {
    _temp: TempDir,
    /// UTF-8 path of the directory.
    pub path: Utf8PathBuf,
}

/// Creates a fresh scratch directory.
pub fn scratch() -> Scratch {
    let temp = TempDir::new().expect("failed to create temp dir");
    let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
        .expect("temp dir should be valid UTF-8");
    Scratch { _temp: temp, path }
}

/// The platform every behaviour suite installs for.
pub fn linux_x64() -> Platform {
    Platform::try_from("x86_64-unknown-linux-gnu").expect("platform should be supported")
}
