//! Media module for content classification and type resolution.

pub mod content;
pub mod mimetype;

pub use content::{blog_image_urls, ContentKind, PostContent, VISIBLE_STATUS};
pub use mimetype::{resolve_extension, resolve_extension_or_fallback, FALLBACK_EXTENSION};
