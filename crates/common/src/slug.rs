//! Slugs derived from titles.

use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[^\p{L}\p{N}]+").unwrap()
});

/// Turn a title into a URL-friendly slug.
///
/// Letters and digits (any script) are kept and lower-cased, every other run
/// of characters collapses into a single `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}
