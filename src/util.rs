//! Small shared helpers: static regex compilation and progress tags.

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

/// Formats a 1-based progress tag, zero-padding the index to the digit
/// count of the total, e.g. `progress_tag(7, 12)` is `"[07/12]"`.
#[must_use]
pub fn progress_tag(index: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("[{index:0width$}/{total}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tag_no_padding_for_single_digit_total() {
        assert_eq!(progress_tag(1, 2), "[1/2]");
        assert_eq!(progress_tag(2, 2), "[2/2]");
    }

    #[test]
    fn test_progress_tag_pads_to_total_width() {
        assert_eq!(progress_tag(7, 12), "[07/12]");
        assert_eq!(progress_tag(12, 12), "[12/12]");
        assert_eq!(progress_tag(3, 100), "[003/100]");
    }
}
