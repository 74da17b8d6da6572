//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Fantia content downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "fantia-downloader",
    version,
    about = "Download posts from Fantia fanclubs",
    long_about = "A CLI tool to download photo galleries, files and blog images from Fantia.\n\n\
                  Accepts fanclub URLs, post URLs or bare fanclub IDs, or every followed or \
                  paid fanclub of the logged-in account."
)]
pub struct Args {
    /// Fanclub or post URLs (or bare fanclub IDs) to download.
    pub urls: Vec<String>,

    /// Value of the `_session_id` cookie.
    #[arg(long = "session-id", env = "FANTIA_SESSION_ID")]
    pub session_id: Option<String>,

    /// Path to configuration file.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Base directory for downloads.
    #[arg(short = 'o', long = "output-directory")]
    pub directory: Option<PathBuf>,

    /// Buffer size for streamed writes, in bytes.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Save fanclub and post metadata plus fanclub imagery.
    #[arg(short = 'm', long)]
    pub dump_metadata: bool,

    /// Record external file-hosting links in a crawljob file.
    #[arg(short = 'x', long)]
    pub parse_for_external_links: bool,

    /// Download post thumbnails.
    #[arg(short = 't', long)]
    pub download_thumbnail: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Skip failed posts and fanclubs instead of stopping.
    #[arg(short = 'c', long)]
    pub continue_on_error: bool,

    /// Name photos after the server's filename.
    #[arg(short = 's', long)]
    pub use_server_filenames: bool,

    /// Mark posts with plan-restricted content with a `.incomplete` file.
    #[arg(short = 'i', long)]
    pub mark_incomplete_posts: bool,

    /// Oldest month (YYYY-MM) to walk back to in fanclub listings.
    #[arg(short = 'l', long)]
    pub month_limit: Option<String>,

    /// File of fanclub/post IDs to skip, one per line.
    #[arg(long = "exclude")]
    pub exclude_file: Option<PathBuf>,

    /// Download every fanclub you follow.
    #[arg(short = 'f', long)]
    pub followed: bool,

    /// Download every fanclub you back on a paid plan.
    #[arg(short = 'p', long)]
    pub paid: bool,

    /// Platform base URL.
    #[arg(long, hide = true)]
    pub base_url: Option<String>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        // Targets given on the command line replace the configured ones
        if !self.urls.is_empty() {
            config.targets.urls = self.urls;
        }

        if self.followed {
            config.targets.followed = true;
        }

        if self.paid {
            config.targets.paid = true;
        }

        if let Some(session_id) = self.session_id {
            config.my_account.session_id = session_id;
        }

        // Override options if provided
        if let Some(dir) = self.directory {
            config.options.directory = Some(dir);
        }

        if let Some(chunk_size) = self.chunk_size {
            config.options.chunk_size = chunk_size;
        }

        if let Some(month) = self.month_limit {
            config.options.month_limit = Some(month);
        }

        if let Some(path) = self.exclude_file {
            config.options.exclude_file = Some(path);
        }

        if let Some(base_url) = self.base_url {
            config.options.base_url = base_url;
        }

        // Boolean flags (only override if set to non-default)
        if self.dump_metadata {
            config.options.dump_metadata = true;
        }

        if self.parse_for_external_links {
            config.options.parse_for_external_links = true;
        }

        if self.download_thumbnail {
            config.options.download_thumb = true;
        }

        if self.quiet {
            config.options.quiet = true;
        }

        if self.continue_on_error {
            config.options.continue_on_error = true;
        }

        if self.use_server_filenames {
            config.options.use_server_filenames = true;
        }

        if self.mark_incomplete_posts {
            config.options.mark_incomplete_posts = true;
        }
    }
}
