//! Fantia API module.
//!
//! This module provides:
//! - HTTP client for the Fantia JSON API and HTML pages
//! - Session cookie authentication
//! - Listing page parsing
//! - API response types

pub mod client;
pub mod listing;
pub mod types;

pub use client::{ApiDocument, FantiaApi};
pub use listing::ListedPost;
pub use types::*;
