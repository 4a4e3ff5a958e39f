//! Per-screenshot resolution of the direct full-size image URL.
//!
//! Each screenshot has a detail page whose markup links to the actual
//! image on the user-content host; those links are the only `href`
//! values containing the `ugc` path marker. The page is known to carry
//! one unrelated `ugc` anchor before the real one, so selection is
//! positional: the second match (index 1) is taken by default. That is a
//! fragile assumption about fixed page structure, which is why the index
//! is an explicit knob here instead of a buried constant.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

use crate::fetch::{FetchError, RetryingFetcher};
use crate::util::compile_static_regex;

const DEFAULT_BASE_URL: &str = "https://steamcommunity.com";

/// Which `ugc` anchor on the detail page holds the image URL (0-based).
pub const DEFAULT_ANCHOR_INDEX: usize = 1;

static UGC_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"(?i)href="([^"]*ugc[^"]*)""#));

/// Resolves a screenshot file id to its direct image URL.
#[derive(Debug)]
pub struct DetailResolver {
    fetcher: RetryingFetcher,
    base_url: String,
    anchor_index: usize,
}

impl DetailResolver {
    /// Creates a resolver against the public Steam community host.
    #[must_use]
    pub fn new(fetcher: RetryingFetcher) -> Self {
        Self::with_base_url(fetcher, DEFAULT_BASE_URL)
    }

    /// Creates a resolver against a custom host (for tests).
    #[must_use]
    pub fn with_base_url(fetcher: RetryingFetcher, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            anchor_index: DEFAULT_ANCHOR_INDEX,
        }
    }

    /// Overrides which matched anchor is selected.
    #[must_use]
    pub fn anchor_index(mut self, index: usize) -> Self {
        self.anchor_index = index;
        self
    }

    /// Fetches the detail page for `file_id` and extracts the image URL.
    ///
    /// Returns `Ok(None)` when the page carries no usable anchor at the
    /// configured position; such items are skipped downstream, never
    /// retried.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the transport retry budget for the
    /// detail-page fetch is exhausted.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, file_id: u64) -> Result<Option<String>, FetchError> {
        let url = format!(
            "{}/sharedfiles/filedetails/?id={}",
            self.base_url.trim_end_matches('/'),
            file_id
        );
        let response = self.fetcher.fetch(&url).await?;
        let Ok(html) = response.text().await else {
            warn!(file_id, "detail page body could not be read");
            return Ok(None);
        };
        Ok(select_ugc_anchor(&html, self.anchor_index))
    }
}

/// Picks the `index`-th `ugc` anchor href and validates it as a URL.
///
/// Too few matches or an unparseable candidate both yield `None`; the
/// original threw on single-match pages, but an unresolved skip is the
/// only sane total behavior here.
fn select_ugc_anchor(html: &str, index: usize) -> Option<String> {
    let value = UGC_HREF_RE
        .captures_iter(html)
        .nth(index)?
        .get(1)?
        .as_str()
        .trim();
    Url::parse(value).is_ok().then(|| value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DETAIL_PAGE: &str = r#"
        <a href="https://steamcommunity.com/ugc/guidelines">Content rules</a>
        <div class="actualmediactn">
          <a href="https://steamuserimages-a.akamaihd.net/ugc/123456789/ABCDEF/">full size</a>
        </div>
    "#;

    #[test]
    fn test_selects_second_anchor_by_default() {
        let url = select_ugc_anchor(DETAIL_PAGE, DEFAULT_ANCHOR_INDEX).unwrap();
        assert_eq!(
            url,
            "https://steamuserimages-a.akamaihd.net/ugc/123456789/ABCDEF/"
        );
    }

    #[test]
    fn test_index_zero_selects_first_anchor() {
        let url = select_ugc_anchor(DETAIL_PAGE, 0).unwrap();
        assert_eq!(url, "https://steamcommunity.com/ugc/guidelines");
    }

    #[test]
    fn test_single_match_page_is_unresolved_at_default_index() {
        let html = r#"<a href="https://steamcommunity.com/ugc/guidelines">rules</a>"#;
        assert_eq!(select_ugc_anchor(html, DEFAULT_ANCHOR_INDEX), None);
    }

    #[test]
    fn test_page_without_ugc_anchors_is_unresolved() {
        let html = r#"<a href="https://steamcommunity.com/profiles/1">profile</a>"#;
        assert_eq!(select_ugc_anchor(html, DEFAULT_ANCHOR_INDEX), None);
    }

    #[test]
    fn test_relative_href_fails_url_validation() {
        let html = r#"
            <a href="/ugc/terms">terms</a>
            <a href="not a url ugc at all">broken</a>
        "#;
        assert_eq!(select_ugc_anchor(html, 1), None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let html = r#"
            <A HREF="https://steamcommunity.com/UGC/guidelines">rules</A>
            <A HREF="https://steamuserimages-a.akamaihd.net/ugc/42/FF/">img</A>
        "#;
        let url = select_ugc_anchor(html, 1).unwrap();
        assert!(url.ends_with("/ugc/42/FF/"));
    }
}
