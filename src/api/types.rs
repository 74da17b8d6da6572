//! API response type definitions.

use serde::{Deserialize, Deserializer};

/// Deserialize an identifier that may arrive as a JSON number or string.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Response of the `/api/v1/me` endpoint. Only used as an auth probe.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub current_user: Option<CurrentUser>,
}

/// Logged-in user summary.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: Option<String>,
}

/// Wrapper for `/api/v1/fanclubs/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FanclubResponse {
    pub fanclub: Fanclub,
}

/// Fanclub details.
#[derive(Debug, Clone, Deserialize)]
pub struct Fanclub {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub creator_name: String,
    pub name: Option<String>,
    pub cover: Option<ImageField>,
    pub icon: Option<ImageField>,
    pub background: Option<ImageField>,
}

/// An image reference.
///
/// `cover` and `icon` nest their URL under `original`, while `background`
/// has been observed as a bare URL; both shapes are accepted everywhere.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    Url(String),
    Sizes { original: Option<String> },
}

impl ImageField {
    /// The full-size URL, if any.
    pub fn original(&self) -> Option<&str> {
        let url = match self {
            ImageField::Url(url) => Some(url.as_str()),
            ImageField::Sizes { original } => original.as_deref(),
        };
        url.filter(|u| !u.is_empty())
    }
}

/// Wrapper for `/api/v1/me/fanclubs`.
#[derive(Debug, Clone, Deserialize)]
pub struct FollowedFanclubsResponse {
    #[serde(default)]
    pub fanclub_ids: Vec<u64>,
}

/// Wrapper for `/api/v1/posts/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct PostResponse {
    pub post: Post,
}

/// A post with its content items.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: Option<String>,
    pub comment: Option<String>,
    pub posted_at: Option<String>,
    pub thumb: Option<ImageField>,
    pub fanclub: PostFanclub,
    #[serde(default)]
    pub post_contents: Vec<RawPostContent>,
}

/// The fanclub reference embedded in a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostFanclub {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub creator_name: String,
}

/// One content item as returned by the API, before classification.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPostContent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: Option<String>,
    pub category: Option<String>,
    pub visible_status: Option<String>,
    pub comment: Option<String>,
    pub parent_post: Option<ParentPost>,
    #[serde(default)]
    pub post_content_photos: Vec<ContentPhoto>,
    pub filename: Option<String>,
    pub download_uri: Option<String>,
    pub embed_url: Option<String>,
}

/// Title of the post a content item belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct ParentPost {
    pub title: Option<String>,
}

/// A photo inside a gallery.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentPhoto {
    pub url: ImageField,
}
