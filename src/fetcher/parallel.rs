use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::app::{Result, TidelineError};
use crate::domain::{FailedSource, FeedSource};
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::normalizer::Normalizer;

pub const DEFAULT_WORKERS: usize = 10;

pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    semaphore: Arc<Semaphore>,
}

impl ParallelFetcher {
    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            fetcher,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Downloads and decodes every enabled source.
    ///
    /// One outcome is returned per enabled source, in configuration order.
    /// A failing source never affects the others.
    pub async fn fetch_all(
        &self,
        sources: &[FeedSource],
        normalizer: &Normalizer,
    ) -> Vec<FetchOutcome> {
        let enabled: Vec<FeedSource> = sources.iter().filter(|s| s.is_enabled()).cloned().collect();
        let disabled = sources.len() - enabled.len();
        if disabled > 0 {
            tracing::info!("Skipping {} disabled sources", disabled);
        }
        tracing::info!("Downloading {} feeds", enabled.len());

        let mut handles = Vec::with_capacity(enabled.len());
        for source in &enabled {
            let fetcher = self.fetcher.clone();
            let semaphore = self.semaphore.clone();
            let normalizer = normalizer.clone();
            let source = source.clone();

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return FetchOutcome::Failed(FailedSource::new(&source, e)),
                };
                fetch_single_source(fetcher.as_ref(), source, &normalizer).await
            }));
        }

        join_all(handles)
            .await
            .into_iter()
            .zip(enabled)
            .map(|(joined, source)| {
                joined.unwrap_or_else(|e| {
                    tracing::error!("Task for {} did not complete: {}", source.url, e);
                    FetchOutcome::Failed(FailedSource::new(&source, e))
                })
            })
            .collect()
    }
}

async fn fetch_single_source(
    fetcher: &(dyn Fetcher + Send + Sync),
    source: FeedSource,
    normalizer: &Normalizer,
) -> FetchOutcome {
    match download(fetcher, &source, normalizer).await {
        Ok(Some(feed)) => {
            tracing::debug!(
                "Fetched {} with {} entries from {}",
                feed.id,
                feed.entries.len(),
                source.url
            );
            FetchOutcome::Fetched { source, feed }
        }
        Ok(None) => FetchOutcome::Skipped { source },
        Err(e) => {
            tracing::warn!("Failed to download {} ({}): {}", source.name, source.url, e);
            FetchOutcome::Failed(FailedSource::new(&source, e))
        }
    }
}

async fn download(
    fetcher: &(dyn Fetcher + Send + Sync),
    source: &FeedSource,
    normalizer: &Normalizer,
) -> Result<Option<crate::domain::Feed>> {
    let body = fetcher.fetch(&source.url).await?;
    normalizer.normalize(&body).map_err(TidelineError::from)
}
