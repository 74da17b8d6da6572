//! Fantia HTTP client.

use std::future::Future;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::{header, Client, Response, StatusCode};
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::api::listing::{parse_paid_fanclubs, parse_posts_page, ListedPost};
use crate::api::types::*;
use crate::error::{Error, Result};

/// Name of the session cookie.
const SESSION_COOKIE: &str = "_session_id";

/// A decoded API document together with its raw JSON, for metadata dumps.
#[derive(Debug, Clone)]
pub struct ApiDocument<T> {
    pub data: T,
    pub raw: Value,
}

/// Authenticated Fantia session.
///
/// Built once after the session cookie has been verified and then shared
/// read-only by everything that performs network I/O.
#[derive(Debug)]
pub struct FantiaApi {
    client: Client,
    base_url: Url,
    cancel: CancellationToken,
}

impl FantiaApi {
    /// Create a client for `base_url` and verify the session cookie.
    pub async fn new(session_id: &str, user_agent: &str, base_url: &str) -> Result<Self> {
        let api = Self::unverified(session_id, user_agent, base_url)?;
        api.verify_session().await?;
        Ok(api)
    }

    /// Create a client without probing the session.
    pub fn unverified(session_id: &str, user_agent: &str, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;

        // The cookie is scoped to the platform host so it is never sent to
        // the CDN hosts that files redirect to.
        let jar = Jar::default();
        jar.add_cookie_str(&format!("{}={}; Path=/", SESSION_COOKIE, session_id), &base_url);

        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_provider(Arc::new(jar))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            cancel: CancellationToken::new(),
        })
    }

    /// Token cancelled when the user interrupts the run.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fail with [`Error::Interrupted`] once the run has been cancelled.
    pub fn check_interrupted(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }
        Ok(())
    }

    /// Await a request future, failing with [`Error::Interrupted`] as soon as
    /// the run is cancelled.
    async fn until_cancelled<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = reqwest::Result<T>>,
    {
        self.check_interrupted()?;
        tokio::select! {
            _ = self.cancel.cancelled() => Err(Error::Interrupted),
            result = future => Ok(result?),
        }
    }

    /// Resolve a possibly relative reference against the base URL.
    pub fn resolve_url(&self, reference: &str) -> Result<Url> {
        Ok(self.base_url.join(reference)?)
    }

    /// Make a GET request to a platform path and check the status.
    async fn get(&self, path: &str, headers: header::HeaderMap) -> Result<Response> {
        let url = self.resolve_url(path)?;

        tracing::debug!("GET {}", url);

        let response = self
            .until_cancelled(self.client.get(url.clone()).headers(headers).send())
            .await?;
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication(format!("HTTP {} for {}", status, url)));
        }

        if !status.is_success() {
            return Err(Error::Fetch {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        headers: header::HeaderMap,
    ) -> Result<ApiDocument<T>> {
        let response = self.get(path, headers).await?;
        let text = self.until_cancelled(response.text()).await?;
        tracing::debug!("{} response length: {} bytes", path, text.len());

        let raw: Value = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                path,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })?;
        let data = serde_json::from_value(raw.clone())
            .map_err(|e| Error::Api(format!("Unexpected response from {}: {}", path, e)))?;

        Ok(ApiDocument { data, raw })
    }

    /// Probe `/api/v1/me` to make sure the session cookie is valid.
    pub async fn verify_session(&self) -> Result<()> {
        let url = self.resolve_url("api/v1/me")?;
        let response = self.until_cancelled(self.client.get(url).send()).await?;
        let status = response.status();

        if !(status.is_success() || status == StatusCode::NOT_MODIFIED) {
            return Err(Error::Authentication(format!(
                "Session check returned HTTP {}. Is the session ID still valid?",
                status
            )));
        }

        if let Ok(me) = response.json::<MeResponse>().await {
            if let Some(user) = me.current_user {
                tracing::info!(
                    "Logged in as {}",
                    user.name.as_deref().unwrap_or(&user.id)
                );
            }
        }

        Ok(())
    }

    /// Get fanclub details.
    pub async fn get_fanclub(&self, fanclub_id: &str) -> Result<ApiDocument<Fanclub>> {
        let path = format!("api/v1/fanclubs/{}", fanclub_id);
        let document: ApiDocument<FanclubResponse> =
            self.get_json(&path, header::HeaderMap::new()).await?;

        Ok(ApiDocument {
            data: document.data.fanclub,
            raw: document.raw,
        })
    }

    /// Get a post with all of its content items.
    pub async fn get_post(&self, post_id: &str) -> Result<ApiDocument<Post>> {
        let mut headers = header::HeaderMap::new();
        headers.insert("X-Requested-With", header::HeaderValue::from_static("XMLHttpRequest"));
        if let Some(token) = self.get_csrf_token(post_id).await? {
            if let Ok(value) = header::HeaderValue::from_str(&token) {
                headers.insert("X-CSRF-Token", value);
            }
        }

        let path = format!("api/v1/posts/{}", post_id);
        let document: ApiDocument<PostResponse> = self.get_json(&path, headers).await?;

        Ok(ApiDocument {
            data: document.data.post,
            raw: document.raw,
        })
    }

    /// Fetch the CSRF token the post API expects, from the post's HTML page.
    ///
    /// A page that cannot be loaded is not fatal; the API call is attempted
    /// without the token.
    async fn get_csrf_token(&self, post_id: &str) -> Result<Option<String>> {
        let path = format!("posts/{}", post_id);
        let html = match self.get(&path, header::HeaderMap::new()).await {
            Ok(response) => self.until_cancelled(response.text()).await?,
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(e) => {
                tracing::debug!("No CSRF token for post {}: {}", post_id, e);
                return Ok(None);
            }
        };

        Ok(extract_csrf_token(&html))
    }

    /// IDs of every fanclub the account follows.
    pub async fn get_followed_fanclubs(&self) -> Result<Vec<String>> {
        let document: ApiDocument<FollowedFanclubsResponse> = self
            .get_json("api/v1/me/fanclubs", header::HeaderMap::new())
            .await?;

        Ok(document
            .data
            .fanclub_ids
            .into_iter()
            .map(|id| id.to_string())
            .collect())
    }

    /// IDs of every fanclub backed on a paid plan.
    pub async fn get_paid_fanclubs(&self) -> Result<Vec<String>> {
        let response = self
            .get("mypage/users/plans?type=not_free", header::HeaderMap::new())
            .await?;
        let html = self.until_cancelled(response.text()).await?;
        parse_paid_fanclubs(&html)
    }

    /// Posts listed on one page (1-based) of a fanclub's post listing.
    pub async fn get_fanclub_posts_page(
        &self,
        fanclub_id: &str,
        page: u32,
    ) -> Result<Vec<ListedPost>> {
        let path = format!("fanclubs/{}/posts?page={}", fanclub_id, page);
        let response = self.get(&path, header::HeaderMap::new()).await?;
        let html = self.until_cancelled(response.text()).await?;
        parse_posts_page(&html)
    }

    /// Ask the server for a resource's declared content type.
    ///
    /// Returns an empty string when the server does not declare one.
    pub async fn probe_content_type(&self, url: &str) -> Result<String> {
        let response = self.until_cancelled(self.client.head(url).send()).await?;

        if !response.status().is_success() {
            return Err(Error::Fetch {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string())
    }

    /// Start downloading a file. The caller checks the status.
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        self.until_cancelled(self.client.get(url).send()).await
    }
}

/// Read `<meta name="csrf-token" content="...">` from a page.
fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"meta[name="csrf-token"]"#).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}
