//! Per-item content dispatch.

use std::collections::HashSet;
use std::path::Path;

use crate::download::asset::{fetch_and_save, fetch_image, FetchOutcome};
use crate::download::state::{DownloadContext, DownloadState};
use crate::error::{Error, Result};
use crate::fs::sanitize_path_component;
use crate::links::extract_external_links;
use crate::media::{blog_image_urls, ContentKind, PostContent};

/// What happened to a content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentOutcome {
    /// The item was handled; counts the assets written or already present.
    Handled { saved: usize, skipped: usize },
    /// The current plan does not grant access to the item.
    Restricted,
    /// The item's category is not handled.
    Unsupported(String),
}

impl ContentOutcome {
    fn from_fetches(outcomes: &[FetchOutcome]) -> Self {
        let saved = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Saved(_)))
            .count();
        ContentOutcome::Handled {
            saved,
            skipped: outcomes.len() - saved,
        }
    }
}

/// Download one content item of a post into `post_dir`.
///
/// Galleries and blogs get their own subdirectory named after
/// `display_title`, which must already be unique within the post.
pub async fn dispatch_content(
    ctx: &DownloadContext<'_>,
    state: &mut DownloadState,
    content: &PostContent,
    post_dir: &Path,
    display_title: &str,
) -> Result<ContentOutcome> {
    if !content.is_visible() {
        tracing::info!(
            "{} ({}), skipping",
            Error::RestrictedContent(content.id.clone()),
            display_title
        );
        state.increment_restricted();
        return Ok(ContentOutcome::Restricted);
    }

    if ctx.options.parse_for_external_links {
        record_links(ctx, state, &content.description(), post_dir).await?;
    }

    let outcome = match &content.kind {
        ContentKind::PhotoGallery { photos } => {
            let dir = post_dir.join(sanitize_path_component(display_title));
            let fetched = fetch_numbered(ctx, photos, &dir).await?;
            ContentOutcome::from_fetches(&fetched)
        }
        ContentKind::File {
            filename,
            download_uri,
        } => {
            let url = ctx.api.resolve_url(download_uri)?;
            let destination = post_dir.join(sanitize_path_component(filename));
            let fetched =
                fetch_and_save(ctx.api, ctx.options, url.as_str(), &destination, true).await?;
            ContentOutcome::from_fetches(&[fetched])
        }
        ContentKind::Embed { embed_url } => {
            if ctx.options.parse_for_external_links {
                let links = vec![embed_url.clone()];
                ctx.crawljob.append(&links, &absolute(post_dir)).await?;
                state.add_links(links.len());
            }
            ContentOutcome::Handled {
                saved: 0,
                skipped: 0,
            }
        }
        ContentKind::Blog { comment } => {
            let urls = blog_image_urls(comment)?
                .iter()
                .map(|original| ctx.api.resolve_url(original).map(|u| u.to_string()))
                .collect::<Result<Vec<_>>>()?;
            let dir = post_dir.join(sanitize_path_component(display_title));
            let fetched = fetch_numbered(ctx, &urls, &dir).await?;
            ContentOutcome::from_fetches(&fetched)
        }
        ContentKind::Unsupported(category) => {
            tracing::info!(
                "{} (content {}), skipping",
                Error::UnsupportedCategory(category.clone()),
                content.id
            );
            state.increment_unsupported();
            return Ok(ContentOutcome::Unsupported(category.clone()));
        }
    };

    if let ContentOutcome::Handled { saved, skipped } = outcome {
        state.files_downloaded += saved as u64;
        state.files_skipped += skipped as u64;
    }

    Ok(outcome)
}

/// Fetch `urls` into `dir` as `0.ext`, `1.ext`, ... in order.
async fn fetch_numbered(
    ctx: &DownloadContext<'_>,
    urls: &[String],
    dir: &Path,
) -> Result<Vec<FetchOutcome>> {
    let mut outcomes = Vec::with_capacity(urls.len());
    for (index, url) in urls.iter().enumerate() {
        let outcome = fetch_image(ctx.api, ctx.options, url, dir, &index.to_string()).await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Append the external links found in `text` to the crawljob file.
pub async fn record_links(
    ctx: &DownloadContext<'_>,
    state: &mut DownloadState,
    text: &str,
    post_dir: &Path,
) -> Result<()> {
    let mut seen = HashSet::new();
    let links: Vec<String> = extract_external_links(text)
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect();
    if links.is_empty() {
        return Ok(());
    }

    tracing::info!("Found {} external link(s)", links.len());
    ctx.crawljob.append(&links, &absolute(post_dir)).await?;
    state.add_links(links.len());
    Ok(())
}

fn absolute(path: &Path) -> std::path::PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
