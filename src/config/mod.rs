//! Configuration module for the fantia-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument parsing and merging
//! - Configuration validation

pub mod loader;
pub mod targets;
pub mod validation;

pub use loader::{
    AccountConfig, Config, OptionsConfig, TargetConfig, DEFAULT_BASE_URL, DEFAULT_CHUNK_SIZE,
};
pub use targets::Target;
pub use validation::{parse_month_limit, parse_target, validate_config};
