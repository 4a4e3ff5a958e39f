//! Steamshots Core Library
//!
//! This library downloads a Steam user's publicly listed screenshots:
//! it walks the paginated screenshot grid, resolves each grid item to the
//! full-size image URL from its detail page, and saves every image under
//! a directory derived from the server's `Content-Disposition` header.
//!
//! # Architecture
//!
//! The pipeline runs in three sequential stages, all built on the same
//! retrying HTTP fetcher:
//! - [`listing`] - paginated discovery of screenshot file ids
//! - [`detail`] - per-id resolution of the direct image URL
//! - [`download`] - streaming retrieval and header-derived naming
//!
//! Supporting modules:
//! - [`fetch`] - fixed-interval retrying HTTP fetcher
//! - [`naming`] - Content-Disposition path derivation with flat fallback
//! - [`model`] - the per-screenshot record tracked across stages

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod detail;
pub mod download;
pub mod fetch;
pub mod listing;
pub mod model;
pub mod naming;

mod util;

// Re-export commonly used types
pub use detail::{DEFAULT_ANCHOR_INDEX, DetailResolver};
pub use download::{DownloadError, DownloadStats, Downloader};
pub use fetch::{FetchError, HttpTransport, RetryPolicy, RetryingFetcher, Transport};
pub use listing::PageScraper;
pub use model::ScreenshotRecord;
pub use util::progress_tag;
