//! Paginated discovery of screenshot file ids from a user's gallery.
//!
//! The Steam community gallery is a paginated HTML grid; each screenshot
//! block carries its numeric file id in an `id="imgWallItem_<id>"`
//! attribute. Discovery walks pages from 1 upward and stops at the first
//! page that yields zero ids even after its own bounded refetch budget.
//! There is deliberately no cross-page lookahead: a transient all-empty
//! page truncates discovery, matching the gallery's actual behavior of
//! serving empty markup for out-of-range pages.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::fetch::{FetchError, RetryingFetcher};
use crate::model::ScreenshotRecord;
use crate::util::compile_static_regex;

const DEFAULT_BASE_URL: &str = "https://steamcommunity.com";

/// How many times a zero-match page is refetched before discovery
/// treats it as the end of the gallery. Distinct from the transport
/// retry budget inside [`RetryingFetcher`]: this guards against pages
/// that load fine but arrive without item markup.
pub const DEFAULT_EMPTY_PAGE_RETRIES: u32 = 10;

static WALL_ITEM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?i)id="imgWallItem_(\d+)""#));

/// Walks a user's screenshot listing pages and collects file ids.
#[derive(Debug)]
pub struct PageScraper {
    fetcher: RetryingFetcher,
    base_url: String,
    empty_page_retries: u32,
}

impl PageScraper {
    /// Creates a scraper against the public Steam community host.
    #[must_use]
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    /// Creates a scraper against a custom host (for tests).
    #[must_use]
    pub fn with_base_url(fetcher: RetryingFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            empty_page_retries: DEFAULT_EMPTY_PAGE_RETRIES,
        }
    }

    /// Overrides the empty-page refetch budget.
    #[must_use]
    pub fn empty_page_retries(mut self, retries: u32) -> Self {
        self.empty_page_retries = retries.max(1);
        self
    }

    /// Discovers every screenshot of `user_id`, in page order.
    ///
    /// Pages are fetched newest-first in grid view, starting at page 1.
    /// The first page yielding zero ids (after its refetch budget) ends
    /// discovery normally; everything accumulated so far is returned.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the transport retry budget for any
    /// page fetch is exhausted.
    pub async fn discover_all(&self, user_id: &str) -> Result<Vec<ScreenshotRecord>, FetchError> {
        let mut records = Vec::new();
        let mut page = 1u32;
        loop {
            let ids = self.fetch_page_ids(user_id, page).await?;
            if ids.is_empty() {
                info!(page, "no more screenshots found");
                break;
            }
            info!(user = user_id, page, found = ids.len(), "collected file ids");
            records.extend(ids.into_iter().map(ScreenshotRecord::new));
            page += 1;
        }
        Ok(records)
    }

    /// Fetches one listing page, refetching while it yields zero ids.
    async fn fetch_page_ids(&self, user_id: &str, page: u32) -> Result<Vec<u64>, FetchError> {
        let url = format!(
            "{}/id/{}/screenshots/?p={}&sort=newestfirst&view=grid",
            self.base_url.trim_end_matches('/'),
            user_id,
            page
        );

        for attempt in 1..=self.empty_page_retries {
            let response = self.fetcher.fetch(&url).await?;
            let html = match response.text().await {
                Ok(html) => html,
                Err(error) => {
                    warn!(page, attempt, error = %error, "listing page body could not be read");
                    String::new()
                }
            };

            let ids = extract_file_ids(&html);
            if !ids.is_empty() {
                return Ok(ids);
            }
            debug!(page, attempt, "listing page yielded no items");
        }
        Ok(Vec::new())
    }
}

/// Extracts every file id from listing-page markup, in document order.
pub(crate) fn extract_file_ids(html: &str) -> Vec<u64> {
    WALL_ITEM_ID_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}
