//! Fantia Downloader - archive fanclubs and posts from fantia.jp
//!
//! This library provides functionality for downloading content from Fantia
//! fanclubs with an existing browser session.
//!
//! # Features
//!
//! - Download whole fanclubs, single posts, or every followed/paid fanclub
//! - Photo galleries, file attachments and blog images
//! - External file-hosting links queued in a JDownloader crawljob file
//! - Optional metadata dumps, thumbnails and incomplete-post markers
//! - Month limit and exclusion list
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use fantia_downloader::{download_target, parse_target, Config, DownloadContext, FantiaApi, GlobalState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let api = FantiaApi::new(
//!         &config.my_account.session_id,
//!         &config.my_account.user_agent,
//!         &config.options.base_url,
//!     ).await?;
//!
//!     let ctx = DownloadContext::new(&api, &config)?;
//!     let mut global = GlobalState::default();
//!     for url in &config.targets.urls {
//!         download_target(&ctx, &mut global, &parse_target(url)?).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod links;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::FantiaApi;
pub use config::{parse_target, Config, Target};
pub use download::{
    download_followed, download_paid, download_post, download_target, process_fanclub,
    DownloadContext, DownloadState, GlobalState,
};
pub use error::{Error, Result};
pub use media::{ContentKind, PostContent};
