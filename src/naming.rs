//! Relative save-path derivation from the `Content-Disposition` header.
//!
//! The image host announces filenames like
//! `2495559_screenshots_20231231123456_1.jpg`: underscores are directory
//! separators, except the last one, which splits off a trailing
//! date/time suffix. The derivation converts the underscores, drops any
//! literal `screenshots` segment, drops the date-bearing tail segment,
//! and names the file `<file_id>.jpg` inside what remains. Every failure
//! mode - absent header, unrecognized value, nothing left after
//! derivation - falls back to a flat `<file_id>.jpg`, so the result is
//! always a usable non-empty relative path.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

use crate::util::compile_static_regex;

static DISPOSITION_FILENAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"inline; filename\*=UTF-8''(?P<encoded>[^;]*);|inline; filename="(?P<quoted>[^"]*)";"#,
    )
});

/// Derives the relative save path for `file_id` from response headers.
///
/// Never errors and never returns an empty path: when the structured
/// derivation fails for any reason the path is flat `<file_id>.jpg`.
#[must_use]
pub fn relative_path(headers: &HeaderMap, file_id: u64) -> PathBuf {
    derive_from_headers(headers, file_id).unwrap_or_else(|| PathBuf::from(format!("{file_id}.jpg")))
}

fn derive_from_headers(headers: &HeaderMap, file_id: u64) -> Option<PathBuf> {
    let disposition = headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
    let raw = parse_disposition_filename(disposition)?;
    let directory = derive_directory(&raw)?;
    Some(directory.join(format!("{file_id}.jpg")))
}

/// Extracts the raw filename from a `Content-Disposition` value.
///
/// Recognizes the quoted `inline; filename="...";` form and the RFC 5987
/// `inline; filename*=UTF-8''...;` form (percent-decoded).
pub(crate) fn parse_disposition_filename(header: &str) -> Option<String> {
    let caps = DISPOSITION_FILENAME_RE.captures(header)?;
    if let Some(encoded) = caps.name("encoded") {
        return urlencoding::decode(encoded.as_str())
            .ok()
            .map(Cow::into_owned);
    }
    caps.name("quoted").map(|m| m.as_str().to_string())
}

/// Applies the underscore-splitting rule and returns the directory part.
///
/// Returns `None` when the value has no underscore, when any derived
/// segment would escape the base directory, or when no directory segment
/// survives the derivation.
pub(crate) fn derive_directory(raw: &str) -> Option<PathBuf> {
    let last_underscore = raw.rfind('_')?;
    let (stem, date_suffix) = raw.split_at(last_underscore);
    let combined = format!("{}{date_suffix}", stem.replace('_', "/"));

    let mut segments: Vec<&str> = combined
        .split('/')
        .filter(|segment| !segment.is_empty() && !segment.eq_ignore_ascii_case("screenshots"))
        .collect();

    if segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }

    // The final segment carries the date/time suffix, not a directory.
    segments.pop()?;
    if segments.is_empty() {
        return None;
    }

    let mut directory = PathBuf::new();
    for segment in segments {
        directory.push(segment);
    }
    Some(directory)
}
