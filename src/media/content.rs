//! Post content classification.

use serde::Deserialize;
use serde_json::Value;

use crate::api::types::RawPostContent;
use crate::error::{Error, Result};

/// Visibility status of content the account can access.
pub const VISIBLE_STATUS: &str = "visible";

/// Category-specific payload of a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    /// Ordered original-size photo URLs.
    PhotoGallery { photos: Vec<String> },
    /// A downloadable file with its server-declared name.
    File {
        filename: String,
        download_uri: String,
    },
    /// An embedded external link.
    Embed { embed_url: String },
    /// A rich-text document with inline images.
    Blog { comment: String },
    /// Any category this tool does not handle.
    Unsupported(String),
}

impl ContentKind {
    /// Category name as used by the API.
    pub fn category(&self) -> &str {
        match self {
            ContentKind::PhotoGallery { .. } => "photo_gallery",
            ContentKind::File { .. } => "file",
            ContentKind::Embed { .. } => "embed",
            ContentKind::Blog { .. } => "blog",
            ContentKind::Unsupported(category) => category,
        }
    }

    fn from_raw(raw: &RawPostContent) -> Result<Self> {
        let category = raw.category.as_deref().unwrap_or_default();
        let missing = |field: &str| {
            Error::Api(format!(
                "Post content {} ({}) has no '{}'",
                raw.id, category, field
            ))
        };

        Ok(match category {
            "photo_gallery" => ContentKind::PhotoGallery {
                photos: raw
                    .post_content_photos
                    .iter()
                    .enumerate()
                    .filter_map(|(index, photo)| {
                        let url = photo.url.original().map(str::to_string);
                        if url.is_none() {
                            tracing::debug!(
                                "Photo {} of content {} has no original URL (skipping)",
                                index,
                                raw.id
                            );
                        }
                        url
                    })
                    .collect(),
            },
            "file" => ContentKind::File {
                filename: raw.filename.clone().ok_or_else(|| missing("filename"))?,
                download_uri: raw
                    .download_uri
                    .clone()
                    .ok_or_else(|| missing("download_uri"))?,
            },
            "embed" => ContentKind::Embed {
                embed_url: raw.embed_url.clone().ok_or_else(|| missing("embed_url"))?,
            },
            "blog" => ContentKind::Blog {
                comment: raw.comment.clone().ok_or_else(|| missing("comment"))?,
            },
            other => ContentKind::Unsupported(other.to_string()),
        })
    }
}

/// A classified content item of a post.
#[derive(Debug, Clone)]
pub struct PostContent {
    pub id: String,
    pub title: Option<String>,
    pub parent_title: Option<String>,
    pub visible_status: String,
    pub comment: Option<String>,
    pub kind: ContentKind,
}

impl PostContent {
    /// Whether the current plan grants access to this item.
    pub fn is_visible(&self) -> bool {
        self.visible_status == VISIBLE_STATUS
    }

    /// Title used for deduplication: own title, else the parent post's title.
    pub fn raw_title(&self) -> Option<&str> {
        [self.title.as_deref(), self.parent_title.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
    }

    /// Free text to scan for external links.
    pub fn description(&self) -> String {
        match &self.kind {
            ContentKind::Blog { comment } => blog_text(comment).unwrap_or_default(),
            _ => self.comment.clone().unwrap_or_default(),
        }
    }
}

impl TryFrom<RawPostContent> for PostContent {
    type Error = Error;

    fn try_from(raw: RawPostContent) -> Result<Self> {
        let visible_status = raw.visible_status.clone().unwrap_or_default();

        // Plan-gated items usually omit their payload, so a malformed
        // payload only matters when the item is actually downloadable.
        let kind = match ContentKind::from_raw(&raw) {
            Ok(kind) => kind,
            Err(e) if visible_status == VISIBLE_STATUS => return Err(e),
            Err(_) => ContentKind::Unsupported(raw.category.clone().unwrap_or_default()),
        };

        Ok(Self {
            id: raw.id,
            title: raw.title,
            parent_title: raw.parent_post.and_then(|p| p.title),
            visible_status,
            comment: raw.comment,
            kind,
        })
    }
}

/// Rich-text blog document.
#[derive(Debug, Deserialize)]
struct BlogDocument {
    #[serde(default)]
    ops: Vec<BlogOp>,
}

#[derive(Debug, Deserialize)]
struct BlogOp {
    #[serde(default)]
    insert: Value,
    #[serde(default)]
    attributes: Option<BlogAttributes>,
}

/// Formatting of an insert; hyperlinked text carries its target here.
#[derive(Debug, Deserialize)]
struct BlogAttributes {
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BlogImage {
    original_url: String,
}

fn parse_blog(comment: &str) -> Result<BlogDocument> {
    Ok(serde_json::from_str(comment)?)
}

/// Inline image URLs of a blog document, in document order.
///
/// URLs may be relative to the platform base URL.
pub fn blog_image_urls(comment: &str) -> Result<Vec<String>> {
    let document = parse_blog(comment)?;

    Ok(document
        .ops
        .into_iter()
        .filter_map(|op| match op.insert {
            Value::Object(mut insert) => insert.remove("fantiaImage"),
            _ => None,
        })
        .filter_map(|image| serde_json::from_value::<BlogImage>(image).ok())
        .map(|image| image.original_url)
        .collect())
}

/// Plain text of a blog document for link scanning.
///
/// The text inserts are concatenated in order, followed by the targets of
/// hyperlinked runs, one per line.
pub fn blog_text(comment: &str) -> Result<String> {
    let document = parse_blog(comment)?;

    let mut text = String::new();
    let mut links = Vec::new();
    for op in document.ops {
        if let Value::String(insert) = op.insert {
            text.push_str(&insert);
        }
        if let Some(link) = op.attributes.and_then(|a| a.link) {
            links.push(link);
        }
    }

    for link in links {
        text.push('\n');
        text.push_str(&link);
    }

    Ok(text)
}
