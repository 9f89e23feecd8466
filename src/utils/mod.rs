pub mod url_validator;

pub use url_validator::validate_url;

/// 拼接完整短链接：`base_url` + `/` + `short_id`
pub fn short_url(base_url: &str, short_id: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), short_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_joins_with_single_slash() {
        assert_eq!(
            short_url("http://localhost:8080", "Ab3dE6gH"),
            "http://localhost:8080/Ab3dE6gH"
        );
        assert_eq!(
            short_url("http://localhost:8080/s/", "Ab3dE6gH"),
            "http://localhost:8080/s/Ab3dE6gH"
        );
    }
}
