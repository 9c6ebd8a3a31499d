use std::fmt::Write as _;
use std::path::Path;

use crate::app::pipeline::{self, Digest};
use crate::app::{AppContext, Result};
use crate::config::Config;
use crate::domain::{Feed, Watermarks};
use crate::normalizer::Normalizer;
use crate::store::WatermarkStore;

pub async fn run(ctx: &AppContext, dry_run: bool) -> Result<()> {
    if ctx.config.feeds.is_empty() {
        println!("No feeds configured");
        return Ok(());
    }

    let digest = pipeline::run_once(ctx, dry_run).await?;
    print!("{}", format_digest(&digest));
    Ok(())
}

pub fn check(path: &Path) -> Result<()> {
    let body = std::fs::read(path)?;

    match Normalizer::new().normalize(&body)? {
        Some(feed) => print!("{}", format_feed(&feed)),
        None => println!("Document is truncated, it would be skipped"),
    }
    Ok(())
}

pub fn list_sources(config: &Config, store: &dyn WatermarkStore) -> Result<()> {
    if config.feeds.is_empty() {
        println!("No feeds configured");
        return Ok(());
    }

    let watermarks = store.load()?;
    print!("{}", format_sources(config, &watermarks));
    Ok(())
}

fn format_digest(digest: &Digest) -> String {
    let mut out = String::new();

    for feed in &digest.feeds {
        out.push_str(&format_feed(feed));
    }

    if !digest.failures.is_empty() {
        let _ = writeln!(out, "Failed sources:");
        for failure in &digest.failures {
            let _ = writeln!(out, "  {} ({}): {}", failure.name, failure.url, failure.reason);
        }
    }

    let _ = writeln!(
        out,
        "{} new entries from {} feeds, {} failures",
        digest.entry_count(),
        digest.feeds.len(),
        digest.failures.len()
    );
    out
}

fn format_feed(feed: &Feed) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n  {}", feed.display_title(), feed.link);

    for entry in &feed.entries {
        let _ = writeln!(
            out,
            "  {} {}\n    {}",
            entry.updated.format("%Y-%m-%d %H:%M"),
            entry.display_title(),
            entry.link
        );
    }
    out
}

fn format_sources(config: &Config, watermarks: &Watermarks) -> String {
    let mut out = String::new();

    for source in &config.feeds {
        let state = if source.is_enabled() { "" } else { " [disabled]" };
        let _ = writeln!(out, "{}{}\n  {}", source.name, state, source.url);
    }

    if !watermarks.is_empty() {
        let _ = writeln!(out, "Watermarks:");
        for (feed_id, at) in watermarks.iter() {
            let _ = writeln!(out, "  {} {}", at.to_rfc3339(), feed_id);
        }
    }
    out
}
