//! File extension resolution from declared media types.

use crate::error::{Error, Result};

/// Extension used when nothing better can be determined.
pub const FALLBACK_EXTENSION: &str = "unknown";

/// Resolve the file extension (without the dot) for a downloaded resource.
///
/// The declared MIME type wins when it is known; otherwise the suffix of the
/// URL path is used. Fails with [`Error::UnknownMediaType`] when neither
/// yields an extension.
pub fn resolve_extension(url: &str, declared_mimetype: &str) -> Result<String> {
    let mimetype = declared_mimetype
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some(ext) = known_extension(&mimetype) {
        return Ok(ext.to_string());
    }

    if let Some(ext) = registry_extension(&mimetype) {
        return Ok(ext);
    }

    if let Some(ext) = extract_extension_from_url(url) {
        return Ok(ext);
    }

    Err(Error::UnknownMediaType {
        url: url.to_string(),
        mimetype: declared_mimetype.to_string(),
    })
}

/// Like [`resolve_extension`], substituting [`FALLBACK_EXTENSION`] on failure.
pub fn resolve_extension_or_fallback(url: &str, declared_mimetype: &str) -> String {
    resolve_extension(url, declared_mimetype).unwrap_or_else(|e| {
        tracing::warn!("{}; using .{}", e, FALLBACK_EXTENSION);
        FALLBACK_EXTENSION.to_string()
    })
}

/// Media types the platform serves.
fn known_extension(mimetype: &str) -> Option<&'static str> {
    match mimetype {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        _ => None,
    }
}

/// Look the type up in the `mime_guess` registry.
///
/// Generic binary types are skipped so the URL suffix gets a chance.
fn registry_extension(mimetype: &str) -> Option<String> {
    if mimetype.is_empty() || mimetype == "application/octet-stream" {
        return None;
    }

    mime_guess::get_mime_extensions_str(mimetype)
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
}

/// Extract extension from URL path.
fn extract_extension_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;

    // Last path segment; query string and fragment are not part of the path
    let filename = parsed.path_segments()?.next_back()?;

    let (stem, ext) = filename.rsplit_once('.')?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !stem.is_empty()
        && !ext.is_empty()
        && ext.len() <= 10
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        Some(ext.to_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(resolve_extension("https://x/a", "image/jpeg").unwrap(), "jpg");
        assert_eq!(resolve_extension("https://x/a", "image/png").unwrap(), "png");
        assert_eq!(resolve_extension("https://x/a", "image/gif").unwrap(), "gif");
        assert_eq!(resolve_extension("https://x/a", "video/mp4").unwrap(), "mp4");
        assert_eq!(resolve_extension("https://x/a", "video/webm").unwrap(), "webm");
    }

    #[test]
    fn test_declared_type_wins_over_url() {
        assert_eq!(
            resolve_extension("https://x/photo.png", "image/jpeg").unwrap(),
            "jpg"
        );
    }

    #[test]
    fn test_mime_parameters_ignored() {
        assert_eq!(
            resolve_extension("https://x/a", "Image/JPEG; charset=binary").unwrap(),
            "jpg"
        );
    }

    #[test]
    fn test_falls_back_to_url_suffix() {
        assert_eq!(
            resolve_extension(
                "https://cc.fantia.jp/uploads/file/archive.ZIP?Expires=1&Signature=x",
                "application/octet-stream"
            )
            .unwrap(),
            "zip"
        );
        assert_eq!(
            resolve_extension("https://x/clip.mov#t=10", "").unwrap(),
            "mov"
        );
    }

    #[test]
    fn test_unknown_media_type() {
        let err = resolve_extension("https://x/download", "application/octet-stream").unwrap_err();
        assert!(matches!(err, Error::UnknownMediaType { .. }));
        assert!(resolve_extension("https://x/.hidden", "").is_err());
        assert!(resolve_extension("https://example.com", "").is_err());
        assert_eq!(
            resolve_extension_or_fallback("https://x/download", ""),
            FALLBACK_EXTENSION
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let cases = [
            ("https://x/a.webp", "image/webp"),
            ("https://x/a", "audio/mpeg"),
            ("https://x/a.bin", "application/x-unknown-thing"),
            ("https://x/a", "image/png"),
        ];
        for (url, mimetype) in cases {
            let first = resolve_extension(url, mimetype).ok();
            for _ in 0..3 {
                assert_eq!(resolve_extension(url, mimetype).ok(), first);
            }
        }
    }
}
