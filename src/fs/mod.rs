//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename sanitizing and title deduplication

pub mod naming;
pub mod paths;

pub use naming::{
    deduplicate_titles, filename_from_content_disposition, filename_from_url,
    sanitize_path_component,
};
pub use paths::{ensure_dir, get_creator_folder, get_post_folder};
