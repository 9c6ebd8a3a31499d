use chrono::{DateTime, Utc};

use crate::domain::{Entry, Feed};
use crate::normalizer::time::parse_time;
use crate::normalizer::xml::Element;
use crate::normalizer::{DecodeError, ToCanonicalFeed};

/// RSS 1.0 (`rdf:RDF`) document. Items are siblings of the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct RdfFeed {
    pub title: String,
    pub link: String,
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<RdfItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdfItem {
    pub title: String,
    pub link: String,
    pub date: Option<DateTime<Utc>>,
    pub description: String,
}

impl RdfFeed {
    pub fn decode(root: &Element) -> Result<Self, DecodeError> {
        if root.name != "RDF" {
            return Err(DecodeError::UnexpectedRoot {
                expected: "RDF",
                found: root.name.clone(),
            });
        }

        let channel = root.child("channel").ok_or(DecodeError::MissingElement {
            element: "channel",
            context: "rdf".to_string(),
        })?;

        let items = root
            .children_named("item")
            .enumerate()
            .map(|(index, item)| RdfItem::decode(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: channel.child_text("title").unwrap_or_default().to_string(),
            link: channel.child_text("link").unwrap_or_default().to_string(),
            date: channel.child_text("date").and_then(parse_time),
            items,
        })
    }
}

impl RdfItem {
    fn decode(index: usize, item: &Element) -> Result<Self, DecodeError> {
        let required = |element: &'static str| {
            item.child_text(element)
                .map(str::to_string)
                .ok_or_else(|| DecodeError::MissingElement {
                    element,
                    context: format!("rdf item #{}", index + 1),
                })
        };

        Ok(Self {
            title: required("title")?,
            link: required("link")?,
            date: item.child_text("date").and_then(parse_time),
            description: required("description")?,
        })
    }
}

impl ToCanonicalFeed for RdfFeed {
    fn to_canonical_feed(&self) -> Result<Feed, DecodeError> {
        let entries = self
            .items
            .iter()
            .filter_map(|item| {
                let Some(updated) = item.date else {
                    tracing::warn!(
                        "Ignoring item {:?} without parseable date for feed {:?}",
                        item.title,
                        self.title
                    );
                    return None;
                };
                Some(Entry {
                    title: item.title.clone(),
                    link: item.link.clone(),
                    id: item.link.clone(),
                    updated,
                    content: item.description.clone(),
                })
            })
            .collect();

        Feed::new(
            self.link.clone(),
            self.title.clone(),
            self.link.clone(),
            self.date,
            entries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::xml::parse;
    use chrono::TimeZone;

    const RDF_SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel rdf:about="https://example.org/">
    <title>Example RDF</title>
    <link>https://example.org/</link>
    <description>RSS 1.0</description>
    <dc:date>2022-07-23T10:00:00+00:00</dc:date>
  </channel>
  <item rdf:about="https://example.org/a">
    <title>A</title>
    <link>https://example.org/a</link>
    <description>First</description>
    <dc:date>2022-07-22T01:00:00+00:00</dc:date>
  </item>
  <item rdf:about="https://example.org/b">
    <title>B</title>
    <link>https://example.org/b</link>
    <description>Second</description>
    <dc:date>2022-07-22T02:00:00+00:00</dc:date>
  </item>
</rdf:RDF>"#;

    #[test]
    fn test_parse_rdf() {
        let root = parse(RDF_SAMPLE.as_bytes()).unwrap();
        let feed = RdfFeed::decode(&root).unwrap().to_canonical_feed().unwrap();

        assert_eq!(feed.id, "https://example.org/");
        assert_eq!(feed.link, "https://example.org/");
        assert_eq!(feed.title, "Example RDF");
        assert_eq!(
            feed.updated,
            Some(Utc.with_ymd_and_hms(2022, 7, 23, 10, 0, 0).unwrap())
        );
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[1].id, "https://example.org/b");
        assert_eq!(feed.entries[1].content, "Second");
    }

    #[test]
    fn test_item_without_date_is_dropped() {
        let root = parse(
            br#"<RDF><channel><link>https://example.org/</link></channel>
                <item><title>A</title><link>https://example.org/a</link><description/></item>
              </RDF>"#,
        )
        .unwrap();
        let feed = RdfFeed::decode(&root).unwrap().to_canonical_feed().unwrap();
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_item_without_link_is_structural_failure() {
        let root = parse(
            br#"<RDF><channel><link>https://example.org/</link></channel>
                <item><title>A</title><description>x</description><date>2022-07-22</date></item>
              </RDF>"#,
        )
        .unwrap();
        let err = RdfFeed::decode(&root).unwrap_err();
        assert!(matches!(err, DecodeError::MissingElement { element: "link", .. }));
    }
}
