//! External link handling.
//!
//! Provides:
//! - Detection of file-hosting links in post text
//! - The append-only crawljob file consumed by an external downloader

pub mod crawljob;
pub mod extract;

pub use crawljob::{CrawljobWriter, CRAWLJOB_FILENAME};
pub use extract::extract_external_links;
