pub mod auth;
pub mod http_fetcher;
pub mod parallel;

use async_trait::async_trait;

use crate::app::Result;
use crate::domain::{FailedSource, Feed, FeedSource};

/// What became of one dispatched source.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Downloaded and decoded.
    Fetched { source: FeedSource, feed: Feed },
    /// The document was truncated; nothing to report.
    Skipped { source: FeedSource },
    /// Download or decode failed.
    Failed(FailedSource),
}

#[async_trait]
pub trait Fetcher {
    /// Raw body of a successful GET on `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
