//! Filename generation and manipulation.

use std::collections::HashSet;

/// Replacement for characters that cannot appear in a path component.
const REPLACEMENT: char = '_';

/// Make a string safe to use as a single path component.
///
/// Characters that are illegal on common filesystems are replaced with `_`,
/// then trailing whitespace and dots are stripped (which also defuses `.`
/// and `..`). Non-empty input never produces an empty result.
pub fn sanitize_path_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | '"' | '?' | '\\' | '/' | '*' | ':' | '|' => REPLACEMENT,
            c if c.is_control() => REPLACEMENT,
            c => c,
        })
        .collect();

    let trimmed = sanitized.trim_end_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.is_empty() && !name.is_empty() {
        REPLACEMENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Assign unique display titles to the items of one post.
///
/// Each item is `(raw_title, fallback_id)`; the fallback is used when the
/// title is missing or empty. Earlier items keep their name, later duplicates
/// get `_2`, `_3`, ... (the first unused suffix).
pub fn deduplicate_titles<I, T, F>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = (Option<T>, F)>,
    T: AsRef<str>,
    F: ToString,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut titles = Vec::new();

    for (raw_title, fallback) in items {
        let candidate = match raw_title {
            Some(title) if !title.as_ref().is_empty() => title.as_ref().to_string(),
            _ => fallback.to_string(),
        };

        let mut title = candidate.clone();
        let mut counter = 2;
        while used.contains(&title) {
            title = format!("{}_{}", candidate, counter);
            counter += 1;
        }

        used.insert(title.clone());
        titles.push(title);
    }

    titles
}

/// Extract the filename from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=` form over plain `filename=`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;

    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };

        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'percent-encoded
                let encoded = value.trim().splitn(3, '\'').last().unwrap_or_default();
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    if !decoded.is_empty() {
                        return Some(decoded.into_owned());
                    }
                }
            }
            "filename" => {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    plain = Some(value.to_string());
                }
            }
            _ => {}
        }
    }

    plain
}

/// Extract the percent-decoded last path segment of a URL.
pub fn filename_from_url(url: &url::Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    Some(decoded)
}
