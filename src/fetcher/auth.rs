//! Bearer credentials attached to requests by URL pattern.

use std::fmt;

use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;

use crate::app::{Result, TidelineError};
use crate::config::RedditConfig;

/// URLs that receive the reddit bearer token.
pub const REDDIT_PATTERN: &str = r"http.+reddit\.com/r/.+";

const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

struct BearerGrant {
    pattern: Regex,
    token: String,
}

/// Host-pattern to bearer-token lookup.
///
/// Credentials are opportunistic: a URL matching no pattern is simply
/// fetched without an `Authorization` header.
#[derive(Default)]
pub struct Credentials {
    grants: Vec<BearerGrant>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bearer(
        mut self,
        pattern: &str,
        token: impl Into<String>,
    ) -> std::result::Result<Self, regex::Error> {
        let token = token.into();
        if token.trim().is_empty() {
            return Ok(self);
        }
        self.grants.push(BearerGrant {
            pattern: Regex::new(pattern)?,
            token,
        });
        Ok(self)
    }

    /// Token for the first pattern matching `url`.
    pub fn bearer_for(&self, url: &str) -> Option<&str> {
        self.grants
            .iter()
            .find(|g| g.pattern.is_match(url))
            .map(|g| g.token.as_str())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.grants.iter().map(|g| g.pattern.as_str()))
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Requests an application-only reddit token (client credentials grant).
pub async fn request_reddit_token(client: &Client, reddit: &RedditConfig) -> Result<String> {
    let response = client
        .post(REDDIT_TOKEN_URL)
        .basic_auth(reddit.client_id.trim(), Some(reddit.client_secret.trim()))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body("grant_type=client_credentials")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TidelineError::Status {
            url: REDDIT_TOKEN_URL.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    let token: TokenResponse = serde_json::from_slice(&body)
        .map_err(|e| TidelineError::Other(format!("failed to decode reddit response: {}", e)))?;

    if token.access_token.is_empty() {
        return Err(TidelineError::Other(
            "reddit response carried no access_token".to_string(),
        ));
    }

    tracing::info!("successfully requested reddit bearer token");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_only_for_matching_urls() {
        let creds = Credentials::new()
            .with_bearer(REDDIT_PATTERN, "tok")
            .unwrap();

        assert_eq!(
            creds.bearer_for("https://www.reddit.com/r/programming/.rss"),
            Some("tok")
        );
        assert_eq!(creds.bearer_for("https://www.reddit.com/"), None);
        assert_eq!(creds.bearer_for("https://blog.golang.org/feed.atom"), None);
    }

    #[test]
    fn test_blank_token_is_not_registered() {
        let creds = Credentials::new().with_bearer(REDDIT_PATTERN, "  ").unwrap();
        assert_eq!(creds.bearer_for("https://www.reddit.com/r/rust/.rss"), None);
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(Credentials::new().with_bearer("(", "tok").is_err());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let creds = Credentials::new()
            .with_bearer(REDDIT_PATTERN, "secret-token")
            .unwrap();
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("reddit"));
    }

    #[test]
    fn test_token_response_decoding() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
    }
}
