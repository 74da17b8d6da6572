//! External file-hosting link extraction.

use std::sync::OnceLock;

use regex::Regex;

/// Links to hosts that a separate downloader can fetch.
fn external_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?:^|\s)((?:https?://)?(?:www\.)?(?:mega\.nz|mediafire\.com|(?:drive|docs)\.google\.com|youtube\.com|dropbox\.com)/\S+)",
        )
        .expect("external link pattern is valid")
    })
}

/// Find external file-hosting links in free text, in order of appearance.
///
/// A link only counts when it starts the text or follows whitespace.
pub fn extract_external_links(text: &str) -> Vec<String> {
    external_link_pattern()
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
