//! Download module for content downloading.
//!
//! This module provides:
//! - Download context and state tracking
//! - Fanclub enumeration and the followed/paid drivers
//! - Post downloading
//! - Per-category content dispatch
//! - Asset fetching

pub mod asset;
pub mod dispatch;
pub mod fanclub;
pub mod post;
pub mod state;

pub use asset::{fetch_and_save, fetch_image, FetchOutcome};
pub use dispatch::{dispatch_content, ContentOutcome};
pub use fanclub::{download_followed, download_paid, download_target, process_fanclub};
pub use post::{download_post, INCOMPLETE_MARKER, METADATA_FILENAME};
pub use state::{DownloadContext, DownloadState, GlobalState};
