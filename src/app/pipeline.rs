//! One fetch, select and commit cycle over the configured sources.

use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::{FailedSource, Feed, Watermarks};
use crate::fetcher::FetchOutcome;
use crate::normalizer::relative::absolutify_feed;
use crate::selector::select_all;

/// New entries grouped by feed, plus the sources that could not be read.
#[derive(Debug, Default, Clone)]
pub struct Digest {
    pub feeds: Vec<Feed>,
    pub failures: Vec<FailedSource>,
}

impl Digest {
    pub fn entry_count(&self) -> usize {
        self.feeds.iter().map(|f| f.entries.len()).sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub max_entries_per_feed: usize,
    pub replace_relative_urls: bool,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            max_entries_per_feed: config.max_entries_per_feed,
            replace_relative_urls: config.replace_relative_urls,
        }
    }
}

/// Reduces fetch outcomes to the entries not yet reported.
///
/// Feeds keep the order of their sources; feeds with nothing new are left
/// out.
pub fn build_digest(
    outcomes: Vec<FetchOutcome>,
    options: &RunOptions,
    watermarks: &Watermarks,
) -> Digest {
    let mut fetched = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Fetched { feed, .. } => fetched.push(feed),
            FetchOutcome::Skipped { source } => {
                tracing::debug!("No feed from {} this run", source.url);
            }
            FetchOutcome::Failed(failure) => failures.push(failure),
        }
    }

    tracing::info!(
        "downloaded {} feeds successfully, {} failures",
        fetched.len(),
        failures.len()
    );

    let mut feeds = select_all(&fetched, options.max_entries_per_feed, watermarks);
    if options.replace_relative_urls {
        feeds.iter_mut().for_each(absolutify_feed);
    }

    Digest { feeds, failures }
}

/// Fetches every enabled source and commits the new watermarks.
///
/// With `dry_run` the store is left untouched. Watermarks are also left
/// alone when nothing new was found.
pub async fn run_once(ctx: &AppContext, dry_run: bool) -> Result<Digest> {
    let mut watermarks = ctx.store.load()?;

    let outcomes = ctx
        .parallel_fetcher
        .fetch_all(&ctx.config.feeds, &ctx.normalizer)
        .await;

    let digest = build_digest(outcomes, &RunOptions::from(&ctx.config), &watermarks);

    if digest.feeds.is_empty() {
        tracing::info!("found no new entries");
        return Ok(digest);
    }
    tracing::info!("found {} new entries", digest.entry_count());

    if dry_run {
        tracing::info!("Dry run, watermarks not saved");
        return Ok(digest);
    }

    watermarks.advance(&digest.feeds);
    ctx.store.save(&watermarks)?;
    tracing::debug!("Saved {} watermarks", watermarks.len());

    Ok(digest)
}
