//! The per-screenshot record tracked through discovery, resolution, and download.

use std::path::PathBuf;

/// One screenshot discovered on a listing page.
///
/// A record is created during discovery with only its `file_id` set.
/// Detail resolution fills in `resource_url` at most once; the download
/// stage fills in `local_path` at most once. A record whose
/// `resource_url` stays `None` is skipped (with a warning) at download
/// time and never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotRecord {
    /// Numeric file id parsed from the listing page; unique within a run.
    pub file_id: u64,
    /// Direct full-size image URL from the detail page, when resolvable.
    pub resource_url: Option<String>,
    /// Where the image was saved, relative to the run's base directory.
    pub local_path: Option<PathBuf>,
}

impl ScreenshotRecord {
    /// Creates a freshly discovered record with no resolution progress.
    #[must_use]
    pub fn new(file_id: u64) -> Self {
        Self {
            file_id,
            resource_url: None,
            local_path: None,
        }
    }
}
