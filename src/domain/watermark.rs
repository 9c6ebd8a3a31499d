use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::domain::Feed;

/// Latest acknowledged entry instant per feed id.
///
/// A feed without a key has never been seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watermarks {
    seen: BTreeMap<String, DateTime<Utc>>,
}

impl Watermarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, feed_id: &str) -> Option<DateTime<Utc>> {
        self.seen.get(feed_id).copied()
    }

    pub fn set(&mut self, feed_id: impl Into<String>, at: DateTime<Utc>) {
        self.seen.insert(feed_id.into(), at);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.seen.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Advances the watermark of every feed in `selected` to the newest entry
    /// it reported.
    ///
    /// Only the entries actually selected count. Entries held back by the
    /// per-feed limit must stay above the watermark so a later run picks
    /// them up.
    pub fn advance(&mut self, selected: &[Feed]) {
        for feed in selected {
            let Some(earliest) = feed.entries.iter().map(|e| e.updated).min() else {
                continue;
            };
            let mark = self.seen.entry(feed.id.clone()).or_insert(earliest);
            for entry in &feed.entries {
                if entry.updated > *mark {
                    *mark = entry.updated;
                }
            }
        }
    }
}

impl FromIterator<(String, DateTime<Utc>)> for Watermarks {
    fn from_iter<I: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: I) -> Self {
        Self {
            seen: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entry;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 7, day, hour, 0, 0).unwrap()
    }

    fn feed(id: &str, dates: &[DateTime<Utc>]) -> Feed {
        let entries = dates
            .iter()
            .enumerate()
            .map(|(i, d)| Entry::new(format!("{id}-{i}"), *d))
            .collect();
        Feed::new(id, id, id, None, entries).unwrap()
    }

    #[test]
    fn test_advance_seeds_unseen_feed() {
        let mut marks = Watermarks::new();
        marks.advance(&[feed("a", &[at(22, 0), at(23, 0)])]);
        assert_eq!(marks.get("a"), Some(at(23, 0)));
    }

    #[test]
    fn test_advance_never_moves_backwards() {
        let mut marks = Watermarks::new();
        marks.set("a", at(25, 0));
        marks.advance(&[feed("a", &[at(23, 0)])]);
        assert_eq!(marks.get("a"), Some(at(25, 0)));
    }

    #[test]
    fn test_advance_leaves_other_feeds_alone() {
        let mut marks = Watermarks::new();
        marks.set("b", at(1, 0));
        marks.advance(&[feed("a", &[at(22, 1)])]);
        assert_eq!(marks.get("b"), Some(at(1, 0)));
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn test_advance_skips_feed_without_entries() {
        let mut marks = Watermarks::new();
        marks.advance(&[feed("a", &[])]);
        assert!(marks.is_empty());
    }
}
