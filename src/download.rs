//! Streaming retrieval of resolved screenshots to local storage.
//!
//! The downloader walks the record batch in discovery order. Records
//! without a resolved URL are fail-soft: one warning, then on to the
//! next item. Everything else is fatal for the run - an exhausted
//! transport retry budget or a local filesystem failure aborts the
//! batch, preserving the asymmetry between degraded items and a broken
//! environment.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::fetch::{FetchError, RetryingFetcher};
use crate::model::ScreenshotRecord;
use crate::naming;
use crate::util::progress_tag;

/// Errors that abort a download run.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Transport retry budget exhausted for a resource fetch.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Response body stream failed mid-download.
    #[error("network error reading body from {url}: {source}")]
    Body {
        /// The resource URL whose body stream failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// File system error while creating directories or writing the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Outcome counts for one download run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    /// Files written to disk.
    pub saved: usize,
    /// Records skipped for lack of a resolved URL.
    pub skipped: usize,
    /// Records processed (saved + skipped).
    pub total: usize,
}

/// Fetches resolved screenshots and streams them to disk.
#[derive(Debug)]
pub struct Downloader {
    fetcher: RetryingFetcher,
}

impl Downloader {
    /// Creates a downloader over the given fetcher.
    #[must_use]
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self { fetcher }
    }

    /// Downloads every resolved record into `base_dir`.
    ///
    /// Save paths come from [`naming::relative_path`] over the response
    /// headers. Missing parent directories are created; an existing
    /// destination file is truncated and overwritten. There is no
    /// post-copy size or checksum verification.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on exhausted transport retries, a
    /// failed body stream, or a filesystem failure. Unresolved records
    /// are not errors; they are counted in [`DownloadStats::skipped`].
    pub async fn run(
        &self,
        base_dir: &Path,
        records: &mut [ScreenshotRecord],
    ) -> Result<DownloadStats, DownloadError> {
        let total = records.len();
        let mut stats = DownloadStats {
            total,
            ..DownloadStats::default()
        };

        for (position, record) in records.iter_mut().enumerate() {
            let tag = progress_tag(position + 1, total);

            let Some(url) = record.resource_url.clone() else {
                warn!(
                    "{tag} screenshot url is not valid for file id {}",
                    record.file_id
                );
                stats.skipped += 1;
                continue;
            };

            let response = self.fetcher.fetch(&url).await?;
            let relative = naming::relative_path(response.headers(), record.file_id);
            let destination = base_dir.join(&relative);

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DownloadError::io(parent, e))?;
            }

            info!("{tag} saving screenshot {}", record.file_id);
            let file = File::create(&destination)
                .await
                .map_err(|e| DownloadError::io(&destination, e))?;
            stream_to_file(file, response, &url, &destination).await?;

            record.local_path = Some(relative);
            stats.saved += 1;
        }

        Ok(stats)
    }
}

/// Streams the response body into the destination file and flushes it.
async fn stream_to_file(
    file: File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
) -> Result<(), DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadError::body(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
    }

    writer.flush().await.map_err(|e| DownloadError::io(path, e))?;
    Ok(())
}
