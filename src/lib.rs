//! # Tideline
//!
//! Fetches Atom, RSS 2.0 and RDF feeds and reports the entries that are new
//! since the previous run.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Selector → Watermark store
//! ```
//!
//! Every source is downloaded concurrently and decoded into one canonical
//! [`Feed`](domain::Feed). The selector keeps the entries newer than the
//! feed's watermark, and the watermarks are advanced once the run's digest
//! is built.
//!
//! ## Quick Start
//!
//! ```bash
//! # Report new entries
//! tideline run
//!
//! # Report without remembering what was seen
//! tideline run --dry-run
//!
//! # Decode a local document
//! tideline check feed.xml
//! ```

/// Application context, error types and the run pipeline.
pub mod app;

/// Command-line interface using clap.
///
/// - `run [--dry-run]` - Report new entries
/// - `check <file>` - Decode a local feed document
/// - `sources` - List configured sources and watermarks
pub mod cli;

/// TOML configuration, loaded from `~/.config/tideline/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed) and [`Entry`](domain::Entry): the canonical feed
/// - [`Watermarks`](domain::Watermarks): newest reported timestamp per feed
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): Concurrent fetching with semaphore
pub mod fetcher;

/// Dialect detection and decoding of Atom, RSS 2.0 and RDF documents.
pub mod normalizer;

/// Entry selection against watermarks.
pub mod selector;

/// Watermark persistence.
///
/// - [`WatermarkStore`](store::WatermarkStore): load/save trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
