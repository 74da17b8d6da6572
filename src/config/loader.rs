//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default platform base URL.
pub const DEFAULT_BASE_URL: &str = "https://fantia.jp/";

/// Default size of streamed write chunks (5 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: TargetConfig,

    #[serde(default)]
    pub my_account: AccountConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// What to download.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Fanclub or post URLs, or bare fanclub IDs.
    #[serde(default)]
    pub urls: Vec<String>,

    /// Download every fanclub the account follows.
    #[serde(default)]
    pub followed: bool,

    /// Download every fanclub backed on a paid plan.
    #[serde(default)]
    pub paid: bool,
}

/// Account credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Value of the `_session_id` cookie from a logged-in browser.
    #[serde(default)]
    pub session_id: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Buffer size for streamed writes, in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Save fanclub and post JSON plus fanclub imagery.
    #[serde(default)]
    pub dump_metadata: bool,

    /// Record external file-hosting links in a crawljob file.
    #[serde(default)]
    pub parse_for_external_links: bool,

    /// Download post thumbnails.
    #[serde(default)]
    pub download_thumb: bool,

    /// Suppress console progress output.
    #[serde(default)]
    pub quiet: bool,

    /// Skip failed posts and fanclubs instead of stopping.
    #[serde(default)]
    pub continue_on_error: bool,

    /// Name photos after the server's filename instead of their index.
    #[serde(default)]
    pub use_server_filenames: bool,

    /// Drop a `.incomplete` marker in posts with plan-restricted content.
    #[serde(default)]
    pub mark_incomplete_posts: bool,

    /// Oldest month (`YYYY-MM`) to walk back to in post listings.
    #[serde(default)]
    pub month_limit: Option<String>,

    /// File of fanclub/post IDs to skip, one per line.
    #[serde(default)]
    pub exclude_file: Option<PathBuf>,

    /// Platform base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            directory: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            dump_metadata: false,
            parse_for_external_links: false,
            download_thumb: false,
            quiet: false,
            continue_on_error: false,
            use_server_filenames: false,
            mark_incomplete_posts: false,
            month_limit: None,
            exclude_file: None,
            base_url: default_base_url(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            session_id: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Load the exclusion list, if one is configured.
    ///
    /// Lines are kept verbatim apart from their line terminator.
    pub fn load_exclusions(&self) -> Result<HashSet<String>> {
        let Some(path) = &self.options.exclude_file else {
            return Ok(HashSet::new());
        };

        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Exclude file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        Ok(content.lines().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [my_account]
            session_id = "abcdef0123456789"
            "#,
        )
        .unwrap();

        assert_eq!(config.my_account.session_id, "abcdef0123456789");
        assert_eq!(config.options.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.options.base_url, DEFAULT_BASE_URL);
        assert!(!config.options.continue_on_error);
        assert!(config.targets.urls.is_empty());
    }

    #[test]
    fn test_full_options_toml() {
        let config: Config = toml::from_str(
            r#"
            [targets]
            urls = ["https://fantia.jp/fanclubs/1234"]
            followed = true

            [my_account]
            session_id = "abcdef"

            [options]
            directory = "/downloads"
            chunk_size = 1024
            dump_metadata = true
            month_limit = "2023-04"
            "#,
        )
        .unwrap();

        assert_eq!(config.targets.urls.len(), 1);
        assert!(config.targets.followed);
        assert!(!config.targets.paid);
        assert_eq!(config.options.chunk_size, 1024);
        assert!(config.options.dump_metadata);
        assert_eq!(config.options.month_limit.as_deref(), Some("2023-04"));
        assert_eq!(config.download_directory(), PathBuf::from("/downloads"));
    }

    #[test]
    fn test_load_exclusions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "555\r\n1234\n  spaced \n").unwrap();

        let mut config = Config::default();
        config.options.exclude_file = Some(file.path().to_path_buf());

        let exclusions = config.load_exclusions().unwrap();
        assert!(exclusions.contains("555"));
        assert!(exclusions.contains("1234"));
        assert!(exclusions.contains("  spaced "));
        assert_eq!(exclusions.len(), 3);
    }

    #[test]
    fn test_load_exclusions_none_configured() {
        let config = Config::default();
        assert!(config.load_exclusions().unwrap().is_empty());
    }

    #[test]
    fn test_load_exclusions_missing_file() {
        let mut config = Config::default();
        config.options.exclude_file = Some(PathBuf::from("/nonexistent/exclusions.txt"));
        assert!(matches!(config.load_exclusions(), Err(Error::Config(_))));
    }
}
