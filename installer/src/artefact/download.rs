//! Archive download for JDK distributions.
//!
//! Provides a trait-based abstraction for fetching vendor archives so that
//! the pipeline can be exercised without network access. The HTTP
//! implementation uses a `ureq` agent; `file://` URLs are served from the
//! local filesystem, which keeps mirrored catalogs and offline tests on the
//! same code path.

use std::path::Path;
use std::time::Duration;

/// Default network timeout for archive downloads.
///
/// JDK archives are close to 200 MiB, so this is far more generous than a
/// metadata request needs.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Trait for downloading archives referenced by catalog entries.
///
/// # Examples
///
/// ```
/// use jdk_installer::artefact::download::HttpDownloader;
///
/// let downloader = HttpDownloader::default();
/// // Use downloader.download(url, dest) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveDownloader {
    /// Download `url` into the file at `dest`, replacing it if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from archive download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested archive was not found (HTTP 404 or missing local file).
    #[error("archive not found: {url}")]
    NotFound {
        /// The URL that could not be resolved.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
pub struct HttpDownloader {
    agent: ureq::Agent,
}

impl HttpDownloader {
    /// Create a downloader whose requests give up after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: http_agent(timeout),
        }
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_DOWNLOAD_TIMEOUT)
    }
}

impl ArchiveDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        if let Some(local) = url.strip_prefix("file://") {
            return copy_local(url, Path::new(local), dest);
        }
        log::debug!("fetching {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)
            .map_err(DownloadError::Io)?;
        Ok(())
    }
}

/// Build a `ureq` agent with a global request timeout.
pub(crate) fn http_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    ureq::Agent::new_with_config(config)
}

fn copy_local(url: &str, source: &Path, dest: &Path) -> Result<(), DownloadError> {
    if !source.is_file() {
        return Err(DownloadError::NotFound {
            url: url.to_owned(),
        });
    }
    log::debug!("copying local archive {}", source.display());
    std::fs::copy(source, dest)?;
    Ok(())
}

/// Map a ureq error to a [`DownloadError`].
pub(crate) fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/jdk.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_to_http_error() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://example.test/jdk.tar.gz", &err);
        assert!(matches!(mapped, DownloadError::HttpError { .. }));
    }

    #[test]
    fn file_urls_are_copied_locally() {
        let temp = tempfile::tempdir().expect("temp dir");
        let source = temp.path().join("jdk.tar.gz");
        std::fs::write(&source, b"archive bytes").expect("write source");
        let dest = temp.path().join("download");

        let url = format!("file://{}", source.display());
        HttpDownloader::default()
            .download(&url, &dest)
            .expect("local copy");

        assert_eq!(std::fs::read(&dest).expect("read"), b"archive bytes");
    }

    #[test]
    fn missing_file_url_is_not_found() {
        let temp = tempfile::tempdir().expect("temp dir");
        let url = format!("file://{}", temp.path().join("absent.tar.gz").display());
        let result = HttpDownloader::default().download(&url, &temp.path().join("out"));
        assert!(matches!(result, Err(DownloadError::NotFound { .. })));
    }
}
