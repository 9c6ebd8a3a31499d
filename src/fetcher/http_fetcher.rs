use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Client;

use crate::app::{Result, TidelineError};
use crate::fetcher::auth::Credentials;
use crate::fetcher::Fetcher;

pub const USER_AGENT: &str = concat!("tideline/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct HttpFetcher {
    client: Client,
    credentials: Credentials,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            credentials: Credentials::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);

        if let Some(token) = self.credentials.bearer_for(url) {
            match HeaderValue::from_str(&format!("bearer {}", token)) {
                Ok(value) => request = request.header(AUTHORIZATION, value),
                Err(_) => tracing::warn!("Bearer token for {} is not a valid header value", url),
            }
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TidelineError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
