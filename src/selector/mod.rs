//! Picks the entries of a feed that have not been reported yet.

use crate::domain::{Entry, Feed, Watermarks};

/// Entries of `feed` newer than its watermark, at most `limit` of them.
///
/// The newest entries win when there are more than `limit`; the result is
/// ordered oldest first. A feed without a watermark has every entry
/// considered new. Entries sharing a timestamp come out in no particular
/// order.
pub fn select_new(feed: &Feed, limit: usize, watermarks: &Watermarks) -> Vec<Entry> {
    let mut copies = feed.entries.clone();
    copies.sort_unstable_by(|a, b| b.updated.cmp(&a.updated));

    let seen = watermarks.get(&feed.id);
    let mut picked: Vec<Entry> = copies
        .into_iter()
        .filter(|e| seen.map_or(true, |mark| e.updated > mark))
        .take(limit)
        .collect();

    picked.sort_unstable_by_key(|e| e.updated);
    picked
}

/// Runs [`select_new`] over every feed, keeping only feeds with new entries.
pub fn select_all(feeds: &[Feed], limit: usize, watermarks: &Watermarks) -> Vec<Feed> {
    feeds
        .iter()
        .filter_map(|feed| {
            let entries = select_new(feed, limit, watermarks);
            if entries.is_empty() {
                None
            } else {
                Some(feed.with_entries(entries))
            }
        })
        .collect()
}
