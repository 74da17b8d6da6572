//! Post download logic.

use std::path::Path;

use serde_json::Value;

use crate::download::asset::{fetch_image, FetchOutcome};
use crate::download::dispatch::{dispatch_content, record_links, ContentOutcome};
use crate::download::state::{DownloadContext, DownloadState};
use crate::error::Result;
use crate::fs::{
    deduplicate_titles, ensure_dir, get_creator_folder, get_post_folder, sanitize_path_component,
};
use crate::media::PostContent;

/// Name of the metadata dump written next to downloaded content.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Marker left in a post directory while some of its content is plan-restricted.
pub const INCOMPLETE_MARKER: &str = ".incomplete";

/// Write a pretty-printed JSON document to `dir/metadata.json`.
pub async fn write_metadata(dir: &Path, raw: &Value) -> Result<()> {
    ensure_dir(dir).await?;
    let json = serde_json::to_string_pretty(raw)?;
    tokio::fs::write(dir.join(METADATA_FILENAME), json).await?;
    Ok(())
}

/// Download a single post by ID.
pub async fn download_post(
    ctx: &DownloadContext<'_>,
    state: &mut DownloadState,
    post_id: &str,
) -> Result<()> {
    tracing::info!("Downloading post {}", post_id);

    let document = ctx.api.get_post(post_id).await?;
    let post = document.data;

    let creator_folder = get_creator_folder(&ctx.root, &post.fanclub.creator_name);
    let post_dir = get_post_folder(&creator_folder, &post.id, post.title.as_deref());
    ensure_dir(&post_dir).await?;

    if state.creator_name.is_none() {
        state.creator_name = Some(post.fanclub.creator_name.clone());
    }
    if state.base_path.is_none() {
        state.base_path = Some(creator_folder);
    }

    if ctx.options.dump_metadata {
        write_metadata(&post_dir, &document.raw).await?;
    }

    if ctx.options.download_thumb {
        match post.thumb.as_ref().and_then(|thumb| thumb.original()) {
            Some(url) => match fetch_image(ctx.api, ctx.options, url, &post_dir, "thumb").await? {
                FetchOutcome::Saved(_) => state.increment_downloaded(),
                FetchOutcome::Skipped(_) => state.increment_skipped(),
            },
            None => tracing::debug!("Post {} has no thumbnail", post.id),
        }
    }

    if ctx.options.parse_for_external_links {
        if let Some(comment) = &post.comment {
            record_links(ctx, state, comment, &post_dir).await?;
        }
    }

    let contents = post
        .post_contents
        .into_iter()
        .map(PostContent::try_from)
        .collect::<Result<Vec<_>>>()?;

    // Titles are compared in their on-disk form.
    let titles = deduplicate_titles(contents.iter().map(|content| {
        (
            content.raw_title().map(sanitize_path_component),
            content.id.as_str(),
        )
    }));

    tracing::debug!("Post {} has {} content item(s)", post.id, contents.len());

    let mut restricted = false;
    for (content, title) in contents.iter().zip(&titles) {
        let outcome = dispatch_content(ctx, state, content, &post_dir, title).await?;
        if outcome == ContentOutcome::Restricted {
            restricted = true;
        }
    }

    if ctx.options.mark_incomplete_posts {
        update_incomplete_marker(&post_dir, restricted).await?;
    }

    state.posts_downloaded += 1;
    Ok(())
}

/// Create or remove the incomplete marker in `post_dir`.
async fn update_incomplete_marker(post_dir: &Path, incomplete: bool) -> Result<()> {
    let marker = post_dir.join(INCOMPLETE_MARKER);

    if incomplete {
        tokio::fs::write(&marker, b"").await?;
    } else if tokio::fs::try_exists(&marker).await? {
        tokio::fs::remove_file(&marker).await?;
    }

    Ok(())
}
