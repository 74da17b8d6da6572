//! Fanclub download logic and top-level drivers.

use chrono::NaiveDate;

use crate::api::{Fanclub, ListedPost};
use crate::config::Target;
use crate::download::asset::{fetch_image, FetchOutcome};
use crate::download::post::{download_post, write_metadata};
use crate::download::state::{DownloadContext, DownloadState, GlobalState};
use crate::error::{Error, Result};
use crate::fs::{ensure_dir, get_creator_folder};

/// Apply the continue-on-error policy to a failed unit of work.
///
/// Interrupts always propagate. Other errors propagate unless
/// `continue_on_error` is set, in which case they are logged.
fn contain(ctx: &DownloadContext<'_>, what: &str, error: Error) -> Result<()> {
    if error.is_interrupt() || !ctx.options.continue_on_error {
        return Err(error);
    }
    tracing::error!("Failed to download {}: {}", what, error);
    Ok(())
}

/// Whether a listed post is older than the month limit.
fn is_before(post: &ListedPost, cutoff: NaiveDate) -> bool {
    post.posted_at
        .map(|posted| posted.date() < cutoff)
        .unwrap_or(false)
}

/// Split a listing page at the month limit.
///
/// Returns the posts to keep and whether enumeration should stop after this
/// page.
fn apply_month_limit(posts: Vec<ListedPost>, cutoff: Option<NaiveDate>) -> (Vec<ListedPost>, bool) {
    let Some(cutoff) = cutoff else {
        return (posts, false);
    };

    let stop = posts.first().is_some_and(|post| is_before(post, cutoff));
    let kept = posts
        .into_iter()
        .filter(|post| !is_before(post, cutoff))
        .collect();
    (kept, stop)
}

/// Collect the IDs of every post in a fanclub, newest first.
pub async fn enumerate_posts(ctx: &DownloadContext<'_>, fanclub_id: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut page = 1;

    loop {
        let posts = ctx.api.get_fanclub_posts_page(fanclub_id, page).await?;
        if posts.is_empty() {
            break;
        }

        let (kept, stop) = apply_month_limit(posts, ctx.month_limit);
        tracing::debug!("Page {}: {} post(s)", page, kept.len());
        ids.extend(kept.into_iter().map(|post| post.id));

        if stop {
            tracing::debug!("Reached month limit on page {}", page);
            break;
        }
        page += 1;
    }

    Ok(ids)
}

/// Save fanclub metadata and its header, icon and background images.
async fn save_fanclub_assets(
    ctx: &DownloadContext<'_>,
    state: &mut DownloadState,
    fanclub: &Fanclub,
    raw: &serde_json::Value,
) -> Result<()> {
    let Some(creator_folder) = state.base_path.clone() else {
        return Ok(());
    };
    write_metadata(&creator_folder, raw).await?;

    let images = [
        ("header", fanclub.cover.as_ref()),
        ("icon", fanclub.icon.as_ref()),
        ("background", fanclub.background.as_ref()),
    ];

    for (stem, image) in images {
        let Some(url) = image.and_then(|image| image.original()) else {
            continue;
        };
        match fetch_image(ctx.api, ctx.options, url, &creator_folder, stem).await? {
            FetchOutcome::Saved(_) => state.increment_downloaded(),
            FetchOutcome::Skipped(_) => state.increment_skipped(),
        }
    }

    Ok(())
}

/// Download every post of a fanclub.
pub async fn process_fanclub(ctx: &DownloadContext<'_>, fanclub_id: &str) -> Result<DownloadState> {
    let mut state = DownloadState::new(fanclub_id.to_string());

    if ctx.is_excluded(fanclub_id) {
        tracing::info!("Fanclub {} is excluded (skipping)", fanclub_id);
        return Ok(state);
    }

    let document = ctx.api.get_fanclub(fanclub_id).await?;
    let fanclub = &document.data;
    let creator_folder = get_creator_folder(&ctx.root, &fanclub.creator_name);
    ensure_dir(&creator_folder).await?;

    state.creator_name = Some(fanclub.creator_name.clone());
    state.base_path = Some(creator_folder);

    tracing::info!("Downloading fanclub {} ({})", fanclub_id, state.label());

    if ctx.options.dump_metadata {
        save_fanclub_assets(ctx, &mut state, fanclub, &document.raw).await?;
    }

    let post_ids = enumerate_posts(ctx, fanclub_id).await?;
    tracing::info!("Found {} post(s) for {}", post_ids.len(), state.label());

    for post_id in &post_ids {
        if ctx.is_excluded(post_id) {
            tracing::info!("Post {} is excluded (skipping)", post_id);
            state.posts_excluded += 1;
            continue;
        }

        if let Err(e) = download_post(ctx, &mut state, post_id).await {
            contain(ctx, &format!("post {}", post_id), e)?;
            state.posts_failed += 1;
        }
    }

    tracing::info!(
        "Fanclub {} complete: {} post(s), {} file(s)",
        state.label(),
        state.posts_downloaded,
        state.files_downloaded
    );

    Ok(state)
}

/// Download a single post as its own unit of work.
async fn process_post(ctx: &DownloadContext<'_>, post_id: &str) -> Result<DownloadState> {
    let mut state = DownloadState::default();

    if ctx.is_excluded(post_id) {
        tracing::info!("Post {} is excluded (skipping)", post_id);
        state.posts_excluded += 1;
        return Ok(state);
    }

    download_post(ctx, &mut state, post_id).await?;
    Ok(state)
}

/// Download a fanclub or post target, recording the result in `global`.
///
/// Returns the per-target state when the target completed.
pub async fn download_target(
    ctx: &DownloadContext<'_>,
    global: &mut GlobalState,
    target: &Target,
) -> Result<Option<DownloadState>> {
    let result = match target {
        Target::Fanclub(id) => process_fanclub(ctx, id).await,
        Target::Post(id) => process_post(ctx, id).await,
    };

    match result {
        Ok(state) => {
            global.add_target_stats(&state);
            Ok(Some(state))
        }
        Err(e) => {
            contain(ctx, &target.to_string(), e)?;
            global.mark_target_failed();
            Ok(None)
        }
    }
}

/// Download every fanclub in `ids`.
async fn download_fanclubs(
    ctx: &DownloadContext<'_>,
    global: &mut GlobalState,
    ids: Vec<String>,
) -> Result<Vec<DownloadState>> {
    let mut states = Vec::new();
    for id in ids {
        if let Some(state) = download_target(ctx, global, &Target::Fanclub(id)).await? {
            states.push(state);
        }
    }
    Ok(states)
}

/// Download every fanclub the account follows.
pub async fn download_followed(
    ctx: &DownloadContext<'_>,
    global: &mut GlobalState,
) -> Result<Vec<DownloadState>> {
    let ids = ctx.api.get_followed_fanclubs().await?;
    tracing::info!("Following {} fanclub(s)", ids.len());
    download_fanclubs(ctx, global, ids).await
}

/// Download every fanclub backed on a paid plan.
pub async fn download_paid(
    ctx: &DownloadContext<'_>,
    global: &mut GlobalState,
) -> Result<Vec<DownloadState>> {
    let ids = ctx.api.get_paid_fanclubs().await?;
    tracing::info!("Backing {} fanclub(s) on a paid plan", ids.len());
    download_fanclubs(ctx, global, ids).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn listed(id: &str, date: Option<&str>) -> ListedPost {
        ListedPost {
            id: id.to_string(),
            posted_at: date.map(|d| NaiveDateTime::parse_from_str(d, "%Y-%m-%d %H:%M").unwrap()),
        }
    }

    fn ids(posts: &[ListedPost]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_month_limit_disabled() {
        let posts = vec![listed("1", Some("2020-01-01 00:00"))];
        let (kept, stop) = apply_month_limit(posts, None);
        assert_eq!(ids(&kept), vec!["1"]);
        assert!(!stop);
    }

    #[test]
    fn test_month_limit_drops_older_posts() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 5, 1);
        let posts = vec![
            listed("3", Some("2023-05-20 10:00")),
            listed("2", Some("2023-05-01 00:00")),
            listed("1", Some("2023-04-30 23:59")),
        ];
        let (kept, stop) = apply_month_limit(posts, cutoff);
        assert_eq!(ids(&kept), vec!["3", "2"]);
        assert!(!stop);
    }

    #[test]
    fn test_month_limit_stops_when_page_starts_old() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 5, 1);
        let posts = vec![
            listed("2", Some("2023-04-10 00:00")),
            listed("1", Some("2023-03-01 00:00")),
        ];
        let (kept, stop) = apply_month_limit(posts, cutoff);
        assert!(kept.is_empty());
        assert!(stop);
    }

    #[test]
    fn test_undated_posts_are_kept() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 5, 1);
        let (kept, stop) = apply_month_limit(vec![listed("9", None)], cutoff);
        assert_eq!(ids(&kept), vec!["9"]);
        assert!(!stop);
    }
}
