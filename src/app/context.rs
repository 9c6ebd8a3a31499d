use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::auth::{request_reddit_token, Credentials, REDDIT_PATTERN};
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::store::{SqliteStore, WatermarkStore};

pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn WatermarkStore + Send + Sync>,
    pub parallel_fetcher: ParallelFetcher,
    pub normalizer: Normalizer,
}

impl AppContext {
    /// Wires the HTTP fetcher and the on-disk watermark store.
    ///
    /// Reddit credentials, when configured, are exchanged for a bearer token
    /// here; a failed exchange only costs authentication.
    pub async fn from_config(config: Config) -> Result<Self> {
        let http = HttpFetcher::new(config.timeout())?;

        let mut credentials = Credentials::new();
        if let Some(reddit) = config.reddit_credentials() {
            match request_reddit_token(http.client(), reddit).await {
                Ok(token) => {
                    credentials = credentials
                        .with_bearer(REDDIT_PATTERN, token)
                        .map_err(|e| crate::app::TidelineError::Other(e.to_string()))?;
                }
                Err(e) => tracing::warn!("Continuing without reddit credentials: {}", e),
            }
        }

        let db_path = config.watermark_db_path()?;
        let store = Arc::new(SqliteStore::new(&db_path)?);
        tracing::debug!("Using watermark database {}", db_path.display());

        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(http.with_credentials(credentials));
        Ok(Self::with_parts(config, store, fetcher))
    }

    pub fn with_parts(
        config: Config,
        store: Arc<dyn WatermarkStore + Send + Sync>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
    ) -> Self {
        let parallel_fetcher = ParallelFetcher::with_workers(fetcher, config.workers);

        Self {
            config,
            store,
            parallel_fetcher,
            normalizer: Normalizer::new(),
        }
    }
}
