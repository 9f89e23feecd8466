//! URL 验证
//!
//! Only absolute `http`/`https` URLs with a host are accepted for shortening.

use url::Url;

use crate::errors::{Result, ShortenerError};

/// 验证并规范化待缩短的 URL，返回去除首尾空白后的原始字符串
///
/// The returned value is the trimmed input, not `Url::to_string()`, so the
/// stored `original_url` stays byte-identical to what the caller sent.
pub fn validate_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShortenerError::validation("URL cannot be empty"));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ShortenerError::validation(format!("Invalid URL format: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ShortenerError::validation(format!(
                "Unsupported scheme '{}:'. Only http:// and https:// are allowed",
                other
            )));
        }
    }

    if parsed.host_str().is_none_or(|h| h.is_empty()) {
        return Err(ShortenerError::validation("URL must contain a host"));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert_eq!(
            validate_url("https://example.com/a").unwrap(),
            "https://example.com/a"
        );
        assert!(validate_url("http://localhost:8080/path?q=1").is_ok());
        assert!(validate_url("HTTPS://EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(
            validate_url("  https://example.com/b \n").unwrap(),
            "https://example.com/b"
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            validate_url("   "),
            Err(ShortenerError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_relative_and_dangerous() {
        for bad in [
            "/relative/path",
            "example.com",
            "javascript:alert(1)",
            "data:text/html,hi",
            "file:///etc/passwd",
            "ftp://example.com",
        ] {
            assert!(
                matches!(validate_url(bad), Err(ShortenerError::Validation(_))),
                "expected rejection for {}",
                bad
            );
        }
    }
}
