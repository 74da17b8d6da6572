//! Download context and state tracking.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::api::FantiaApi;
use crate::config::{parse_month_limit, Config, OptionsConfig};
use crate::error::Result;
use crate::links::CrawljobWriter;

/// Read-only inputs shared by every download in a run.
pub struct DownloadContext<'a> {
    pub api: &'a FantiaApi,
    pub options: &'a OptionsConfig,
    /// Download root directory.
    pub root: PathBuf,
    /// Fanclub and post IDs to skip.
    pub exclusions: HashSet<String>,
    /// Oldest month to walk back to in post listings.
    pub month_limit: Option<NaiveDate>,
    pub crawljob: CrawljobWriter,
}

impl<'a> DownloadContext<'a> {
    /// Build the context for a run, loading the exclusion list once.
    pub fn new(api: &'a FantiaApi, config: &'a Config) -> Result<Self> {
        let root = config.download_directory();
        let month_limit = config
            .options
            .month_limit
            .as_deref()
            .map(parse_month_limit)
            .transpose()?;

        Ok(Self {
            api,
            options: &config.options,
            crawljob: CrawljobWriter::new(&root),
            exclusions: config.load_exclusions()?,
            month_limit,
            root,
        })
    }

    /// Whether a fanclub or post ID is on the exclusion list.
    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclusions.contains(id)
    }
}

/// Per-fanclub download state.
#[derive(Debug, Default)]
pub struct DownloadState {
    // Fanclub info
    pub fanclub_id: Option<String>,
    pub creator_name: Option<String>,

    // Paths
    pub base_path: Option<PathBuf>,

    // Statistics
    pub posts_downloaded: u64,
    pub posts_failed: u64,
    pub posts_excluded: u64,
    pub files_downloaded: u64,
    pub files_skipped: u64,
    pub restricted_count: u64,
    pub unsupported_count: u64,
    pub links_recorded: u64,
}

impl DownloadState {
    /// Create a new download state for a fanclub.
    pub fn new(fanclub_id: String) -> Self {
        Self {
            fanclub_id: Some(fanclub_id),
            ..Default::default()
        }
    }

    /// Display label for log lines.
    pub fn label(&self) -> &str {
        self.creator_name
            .as_deref()
            .or(self.fanclub_id.as_deref())
            .unwrap_or("unknown")
    }

    /// Increment the downloaded file count.
    pub fn increment_downloaded(&mut self) {
        self.files_downloaded += 1;
    }

    /// Increment the count of files that already existed.
    pub fn increment_skipped(&mut self) {
        self.files_skipped += 1;
    }

    /// Increment the count of plan-restricted content items.
    pub fn increment_restricted(&mut self) {
        self.restricted_count += 1;
    }

    /// Increment the count of unsupported content items.
    pub fn increment_unsupported(&mut self) {
        self.unsupported_count += 1;
    }

    /// Add to the count of external links written to the crawljob file.
    pub fn add_links(&mut self, count: usize) {
        self.links_recorded += count as u64;
    }
}

/// Global statistics across all targets.
#[derive(Debug, Default)]
pub struct GlobalState {
    pub posts_downloaded: u64,
    pub posts_failed: u64,
    pub files_downloaded: u64,
    pub files_skipped: u64,
    pub restricted_count: u64,
    pub links_recorded: u64,
    pub targets_processed: u64,
    pub targets_failed: u64,
}

impl GlobalState {
    /// Add statistics from a fanclub or post download state.
    pub fn add_target_stats(&mut self, state: &DownloadState) {
        self.posts_downloaded += state.posts_downloaded;
        self.posts_failed += state.posts_failed;
        self.files_downloaded += state.files_downloaded;
        self.files_skipped += state.files_skipped;
        self.restricted_count += state.restricted_count;
        self.links_recorded += state.links_recorded;
        self.targets_processed += 1;
    }

    /// Mark a target as failed.
    pub fn mark_target_failed(&mut self) {
        self.targets_failed += 1;
    }
}
