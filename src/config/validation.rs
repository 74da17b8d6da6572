//! Configuration validation logic.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use url::Url;

use crate::config::loader::Config;
use crate::config::targets::Target;
use crate::error::{Error, Result};

/// Matches `https://fantia.jp/fanclubs/123` and `https://fantia.jp/posts/123`.
fn target_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https?://(?:www\.)?fantia\.jp/(fanclubs|posts)/([0-9]+)")
            .expect("target URL pattern is valid")
    })
}

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_session_id(&config.my_account.session_id)?;
    validate_chunk_size(config.options.chunk_size)?;
    validate_base_url(&config.options.base_url)?;

    if let Some(month) = &config.options.month_limit {
        parse_month_limit(month)?;
    }

    if config.targets.urls.is_empty() && !config.targets.followed && !config.targets.paid {
        return Err(Error::MissingConfig(
            "targets (provide a fanclub/post URL, --followed, or --paid)".to_string(),
        ));
    }

    for input in &config.targets.urls {
        parse_target(input)?;
    }

    Ok(())
}

/// Validate the session cookie value.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(Error::MissingConfig("session_id".to_string()));
    }

    if session_id
        .chars()
        .any(|c| c.is_whitespace() || c == ';' || c == '=')
    {
        return Err(Error::ConfigValidation {
            field: "session_id".to_string(),
            message: "Session ID must be the raw _session_id cookie value".to_string(),
        });
    }

    let lower = session_id.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_session") {
        return Err(Error::ConfigValidation {
            field: "session_id".to_string(),
            message: "Session ID appears to be a placeholder. Copy _session_id from your browser."
                .to_string(),
        });
    }

    Ok(())
}

/// Validate the streamed write chunk size.
pub fn validate_chunk_size(chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::ConfigValidation {
            field: "chunk_size".to_string(),
            message: "Chunk size must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(Error::ConfigValidation {
            field: "base_url".to_string(),
            message: format!("'{}' cannot be used as a base URL", base_url),
        });
    }
    Ok(())
}

/// Parse a `YYYY-MM` month limit into the first day of that month.
pub fn parse_month_limit(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d").map_err(|_| {
        Error::ConfigValidation {
            field: "month_limit".to_string(),
            message: format!("Invalid month '{}'. Expected YYYY-MM.", input),
        }
    })
}

/// Extract a download target from a URL or a bare fanclub ID.
pub fn parse_target(input: &str) -> Result<Target> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        let captures = target_url_pattern()
            .captures(input)
            .ok_or_else(|| Error::InvalidTarget(format!("Unsupported URL: {}", input)))?;

        let id = captures[2].to_string();
        return Ok(match &captures[1] {
            "posts" => Target::Post(id),
            _ => Target::Fanclub(id),
        });
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Target::Fanclub(input.to_string()));
    }

    Err(Error::InvalidTarget(format!(
        "'{}' is neither a Fantia URL nor a fanclub ID",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_fanclub_url() {
        assert_eq!(
            parse_target("https://fantia.jp/fanclubs/1234").unwrap(),
            Target::Fanclub("1234".to_string())
        );
        assert_eq!(
            parse_target("https://www.fantia.jp/fanclubs/1234/posts").unwrap(),
            Target::Fanclub("1234".to_string())
        );
    }

    #[test]
    fn test_parse_target_post_url() {
        assert_eq!(
            parse_target("https://fantia.jp/posts/987654").unwrap(),
            Target::Post("987654".to_string())
        );
    }

    #[test]
    fn test_parse_target_bare_id() {
        assert_eq!(
            parse_target(" 42 ").unwrap(),
            Target::Fanclub("42".to_string())
        );
    }

    #[test]
    fn test_parse_target_invalid() {
        assert!(parse_target("https://example.com/fanclubs/1").is_err());
        assert!(parse_target("not-an-id").is_err());
        assert!(parse_target("").is_err());
    }

    #[test]
    fn test_parse_month_limit() {
        assert_eq!(
            parse_month_limit("2023-04").unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );
        assert!(parse_month_limit("2023-13").is_err());
        assert!(parse_month_limit("April 2023").is_err());
    }

    #[test]
    fn test_validate_session_id() {
        assert!(validate_session_id("0123456789abcdef").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("abc; def").is_err());
        assert!(validate_session_id("REPLACEME").is_err());
    }

    #[test]
    fn test_validate_config_requires_target() {
        let mut config = Config::default();
        config.my_account.session_id = "0123456789abcdef".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(Error::MissingConfig(_))
        ));

        config.targets.followed = true;
        assert!(validate_config(&config).is_ok());

        config.targets.urls.push("https://fantia.jp/nope".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_config_rejects_zero_chunk() {
        let mut config = Config::default();
        config.my_account.session_id = "0123456789abcdef".to_string();
        config.targets.paid = true;
        config.options.chunk_size = 0;
        assert!(validate_config(&config).is_err());
    }
}
