//! Archive integrity verification.
//!
//! Every downloaded archive is hashed and compared against the digest the
//! catalog recorded for it before a single entry is extracted. There is no
//! policy switch: an archive that cannot be verified is never used.

use super::sha256_digest::Sha256Digest;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Errors arising from archive verification.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The archive digest differs from the catalog value.
    #[error("checksum mismatch for {archive}: expected {expected}, actual {actual}")]
    ChecksumMismatch {
        /// File name of the rejected archive.
        archive: String,
        /// Digest recorded in the catalog.
        expected: Sha256Digest,
        /// Digest computed from the downloaded bytes.
        actual: Sha256Digest,
    },

    /// The archive could not be read.
    #[error("failed to hash archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in chunks and returns the lowercase hex
/// digest as a validated [`Sha256Digest`].
///
/// # Errors
///
/// Returns [`VerificationError::Io`] if the file cannot be read.
pub fn compute_sha256(path: &Path) -> Result<Sha256Digest, VerificationError> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    let hex = format!("{:x}", hasher.finalize());
    Sha256Digest::try_from(hex)
        .map_err(|e| VerificationError::Io(std::io::Error::other(e.to_string())))
}

/// Verify that the archive at `path` hashes to `expected`.
///
/// # Errors
///
/// Returns [`VerificationError::ChecksumMismatch`] when the digests differ
/// and [`VerificationError::Io`] when the archive cannot be read.
///
/// # Examples
///
/// ```
/// use jdk_installer::artefact::sha256_digest::Sha256Digest;
/// use jdk_installer::artefact::verification::verify_archive;
///
/// let temp = tempfile::tempdir().expect("temp dir");
/// let archive = temp.path().join("empty.tar.gz");
/// std::fs::write(&archive, b"").expect("write");
/// let expected = Sha256Digest::try_from(
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// )
/// .expect("valid digest");
/// assert!(verify_archive(&archive, &expected).is_ok());
/// ```
pub fn verify_archive(path: &Path, expected: &Sha256Digest) -> Result<(), VerificationError> {
    let actual = compute_sha256(path)?;
    if &actual != expected {
        return Err(VerificationError::ChecksumMismatch {
            archive: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            expected: expected.clone(),
            actual,
        });
    }
    log::debug!("verified {} ({actual})", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    fn write_hello() -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("hello.tar.gz");
        fs::write(&path, b"hello\n").expect("write");
        (temp, path)
    }

    #[test]
    fn computes_known_digest() {
        let (_temp, path) = write_hello();
        let digest = compute_sha256(&path).expect("hash");
        assert_eq!(digest.as_str(), HELLO_SHA256);
    }

    #[test]
    fn matching_digest_verifies() {
        let (_temp, path) = write_hello();
        let expected = Sha256Digest::try_from(HELLO_SHA256).expect("valid");
        assert!(verify_archive(&path, &expected).is_ok());
    }

    #[test]
    fn mismatched_digest_is_rejected_with_both_values() {
        let (_temp, path) = write_hello();
        let expected = Sha256Digest::try_from("a".repeat(64)).expect("valid");
        let err = verify_archive(&path, &expected).expect_err("mismatch");
        let message = err.to_string();
        assert!(message.contains("hello.tar.gz"));
        assert!(message.contains(&"a".repeat(64)));
        assert!(message.contains(HELLO_SHA256));
    }

    #[test]
    fn missing_archive_is_io_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let expected = Sha256Digest::try_from(HELLO_SHA256).expect("valid");
        let result = verify_archive(&temp.path().join("absent"), &expected);
        assert!(matches!(result, Err(VerificationError::Io(_))));
    }
}
