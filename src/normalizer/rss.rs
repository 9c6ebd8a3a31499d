use crate::domain::{Entry, Feed};
use crate::normalizer::link::{self, Link};
use crate::normalizer::time::parse_time;
use crate::normalizer::xml::Element;
use crate::normalizer::{DecodeError, ToCanonicalFeed};

/// RSS 0.9x / 2.0 document.
#[derive(Debug, Clone, PartialEq)]
pub struct RssFeed {
    pub title: String,
    pub links: Vec<Link>,
    pub last_build_date: Option<String>,
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub encoded: String,
    pub guid: String,
    pub pub_date: Option<String>,
}

impl RssFeed {
    pub fn decode(root: &Element) -> Result<Self, DecodeError> {
        if root.name != "rss" {
            return Err(DecodeError::UnexpectedRoot {
                expected: "rss",
                found: root.name.clone(),
            });
        }

        let channel = root.child("channel").ok_or(DecodeError::MissingElement {
            element: "channel",
            context: "rss".to_string(),
        })?;

        Ok(Self {
            title: channel.child_text("title").unwrap_or_default().to_string(),
            links: Link::resolve_all(channel)?,
            last_build_date: channel.child_text_nonempty("lastBuildDate").map(str::to_string),
            items: channel.children_named("item").map(RssItem::decode).collect(),
        })
    }
}

impl RssItem {
    fn decode(item: &Element) -> Self {
        let text = |name: &str| item.child_text(name).unwrap_or_default().to_string();
        Self {
            title: text("title"),
            link: text("link"),
            description: text("description"),
            encoded: text("encoded"),
            guid: text("guid"),
            pub_date: item.child_text_nonempty("pubDate").map(str::to_string),
        }
    }
}

impl ToCanonicalFeed for RssFeed {
    fn to_canonical_feed(&self) -> Result<Feed, DecodeError> {
        let (Some(id), Some(human)) = (link::self_link(&self.links), link::alternate(&self.links))
        else {
            return Err(DecodeError::MissingLink {
                title: self.title.clone(),
            });
        };

        let updated = match self.last_build_date.as_deref() {
            Some(raw) => {
                let parsed = parse_time(raw);
                if parsed.is_none() {
                    tracing::warn!(
                        "Unparseable lastBuildDate {:?} for feed {:?}",
                        raw,
                        self.title
                    );
                }
                parsed
            }
            None => None,
        };

        let mut entries = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let Some(raw) = item.pub_date.as_deref() else {
                tracing::info!(
                    "Ignoring item {:?} without pubDate field for feed {:?}",
                    item.title,
                    self.title
                );
                continue;
            };
            let Some(updated) = parse_time(raw) else {
                tracing::warn!(
                    "Ignoring item {:?} with unparseable pubDate {:?} for feed {:?}",
                    item.title,
                    raw,
                    self.title
                );
                continue;
            };

            let id = if item.guid.is_empty() {
                item.link.clone()
            } else {
                item.guid.clone()
            };
            let content = if item.description.is_empty() {
                item.encoded.clone()
            } else {
                item.description.clone()
            };

            entries.push(Entry {
                title: item.title.clone(),
                link: item.link.clone(),
                id,
                updated,
                content,
            });
        }

        Feed::new(
            id.href.clone(),
            self.title.clone(),
            human.href.clone(),
            updated,
            entries,
        )
    }
}
