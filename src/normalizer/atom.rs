use chrono::{DateTime, Utc};

use crate::domain::{Entry, Feed};
use crate::normalizer::link::{self, Link};
use crate::normalizer::time::parse_time;
use crate::normalizer::xml::Element;
use crate::normalizer::{DecodeError, ToCanonicalFeed};

#[derive(Debug, Clone, PartialEq)]
pub struct AtomFeed {
    pub title: String,
    pub id: String,
    pub links: Vec<Link>,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<AtomEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomEntry {
    pub title: String,
    pub id: String,
    pub links: Vec<Link>,
    pub updated: Option<DateTime<Utc>>,
    pub content: String,
    pub summary: String,
    pub media: Option<MediaGroup>,
}

/// `media:group` as published by YouTube channel feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaGroup {
    pub description: String,
    pub content_url: Option<String>,
    pub thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

impl AtomFeed {
    pub fn decode(root: &Element) -> Result<Self, DecodeError> {
        if root.name != "feed" {
            return Err(DecodeError::UnexpectedRoot {
                expected: "feed",
                found: root.name.clone(),
            });
        }

        let entries = root
            .children_named("entry")
            .map(AtomEntry::decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: root.child_text("title").unwrap_or_default().to_string(),
            id: root.child_text("id").unwrap_or_default().to_string(),
            links: Link::resolve_all(root)?,
            updated: root.child_text("updated").and_then(parse_time),
            entries,
        })
    }
}

impl AtomEntry {
    fn decode(element: &Element) -> Result<Self, DecodeError> {
        let updated = element
            .child_text_nonempty("updated")
            .or_else(|| element.child_text_nonempty("published"))
            .and_then(parse_time);

        Ok(Self {
            title: element.child_text("title").unwrap_or_default().to_string(),
            id: element.child_text("id").unwrap_or_default().to_string(),
            links: Link::resolve_all(element)?,
            updated,
            content: element.child_text("content").unwrap_or_default().to_string(),
            summary: element.child_text("summary").unwrap_or_default().to_string(),
            media: element.child("group").map(MediaGroup::decode),
        })
    }

    /// Primary content, else the synthesized media block, else the summary.
    fn body(&self) -> String {
        if !self.content.is_empty() {
            return self.content.clone();
        }
        match &self.media {
            Some(media) => media.html(),
            None => self.summary.clone(),
        }
    }
}

impl MediaGroup {
    fn decode(group: &Element) -> Self {
        let thumbnail = group.child("thumbnail").and_then(|t| {
            let url = t.attr("url")?.trim().to_string();
            Some(Thumbnail {
                url,
                width: parse_dimension(t.attr("width")),
                height: parse_dimension(t.attr("height")),
            })
        });

        Self {
            description: group.child_text("description").unwrap_or_default().to_string(),
            content_url: group
                .child("content")
                .and_then(|c| c.attr("url"))
                .map(|u| u.trim().to_string()),
            thumbnail,
        }
    }

    pub fn html(&self) -> String {
        let mut html = format!("<div>{}</div>", self.description);
        if let Some(thumb) = &self.thumbnail {
            let target = self.content_url.as_deref().unwrap_or(&thumb.url);
            html.push_str(&format!(
                r#"<div><a href="{}"><img src="{}" width="{}" height="{}" /></a></div>"#,
                target, thumb.url, thumb.width, thumb.height
            ));
        }
        html
    }
}

fn parse_dimension(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

impl ToCanonicalFeed for AtomFeed {
    fn to_canonical_feed(&self) -> Result<Feed, DecodeError> {
        let primary = link::first_non_self(&self.links).map(|l| l.href.clone());
        let id = primary.clone().unwrap_or_else(|| self.id.clone());
        let human = primary
            .or_else(|| self.links.first().map(|l| l.href.clone()))
            .unwrap_or_else(|| id.clone());

        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let Some(updated) = entry.updated else {
                tracing::warn!(
                    "Ignoring entry {:?} without parseable date in feed {:?}",
                    entry.title,
                    self.title
                );
                continue;
            };

            entries.push(Entry {
                title: entry.title.clone(),
                link: link::alternate(&entry.links)
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                id: entry.id.clone(),
                updated,
                content: entry.body(),
            });
        }

        Feed::new(id, self.title.clone(), human, self.updated, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::xml::parse;
    use chrono::TimeZone;

    const YOUTUBE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <link rel="self" href="http://www.youtube.com/feeds/videos.xml?channel_id=UCckETVOT59aYw80B36aP9vw"/>
 <id>yt:channel:UCckETVOT59aYw80B36aP9vw</id>
 <title>Matthias Wandel</title>
 <link rel="alternate" href="https://www.youtube.com/channel/UCckETVOT59aYw80B36aP9vw"/>
 <published>2006-08-20T01:36:50+00:00</published>
 <entry>
  <id>yt:video:9eRIUV94kgQ</id>
  <title>26" bandsaw sawdust drawer and bottom enclosure</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=9eRIUV94kgQ"/>
  <published>2020-05-09T12:00:04+00:00</published>
  <updated>2020-05-10T03:26:40+00:00</updated>
  <media:group>
   <media:title>26" bandsaw sawdust drawer and bottom enclosure</media:title>
   <media:content url="https://www.youtube.com/v/9eRIUV94kgQ?version=3" type="application/x-shockwave-flash" width="640" height="390"/>
   <media:thumbnail url="https://i2.ytimg.com/vi/9eRIUV94kgQ/hqdefault.jpg" width="480" height="360"/>
   <media:description>Working on finishing up my 26" bandsaw.</media:description>
   <media:community>
    <media:starRating count="1300" average="4.95" min="1" max="5"/>
    <media:statistics views="30000"/>
   </media:community>
  </media:group>
 </entry>
</feed>"#;

    fn canonical(xml: &str) -> Feed {
        let root = parse(xml.as_bytes()).unwrap();
        AtomFeed::decode(&root).unwrap().to_canonical_feed().unwrap()
    }

    #[test]
    fn test_youtube_media_group_content() {
        let feed = canonical(YOUTUBE);
        assert_eq!(feed.title, "Matthias Wandel");
        assert_eq!(
            feed.link,
            "https://www.youtube.com/channel/UCckETVOT59aYw80B36aP9vw"
        );
        assert_eq!(feed.id, feed.link);
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.link, "https://www.youtube.com/watch?v=9eRIUV94kgQ");
        assert_eq!(entry.id, "yt:video:9eRIUV94kgQ");
        assert_eq!(
            entry.updated,
            Utc.with_ymd_and_hms(2020, 5, 10, 3, 26, 40).unwrap()
        );
        assert_eq!(
            entry.content,
            "<div>Working on finishing up my 26\" bandsaw.</div><div><a href=\"https://www.youtube.com/v/9eRIUV94kgQ?version=3\"><img src=\"https://i2.ytimg.com/vi/9eRIUV94kgQ/hqdefault.jpg\" width=\"480\" height=\"360\" /></a></div>"
        );
    }

    #[test]
    fn test_reddit_style_escaped_html_content() {
        let feed = canonical(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <category term="programming" label="r/programming"/>
  <updated>2020-12-03T08:00:00+00:00</updated>
  <id>/r/programming.rss</id>
  <link rel="self" href="https://www.reddit.com/r/programming.rss" type="application/atom+xml" />
  <link rel="alternate" href="https://www.reddit.com/r/programming/" type="text/html" />
  <title>programming</title>
  <entry>
    <content type="html">&lt;p&gt;submitted by &lt;a href="/u/x"&gt;x&lt;/a&gt;&lt;/p&gt;</content>
    <id>t3_k5j5gf</id>
    <link href="https://www.reddit.com/r/programming/comments/k5j5gf/dark_mode/" />
    <updated>2020-12-02T20:47:59+00:00</updated>
    <title>Dark Mode Coming to GitHub After 7 Years</title>
  </entry>
</feed>"#,
        );
        assert_eq!(feed.link, "https://www.reddit.com/r/programming/");
        assert_eq!(feed.id, "https://www.reddit.com/r/programming/");
        assert_eq!(
            feed.updated,
            Some(Utc.with_ymd_and_hms(2020, 12, 3, 8, 0, 0).unwrap())
        );
        assert_eq!(feed.entries[0].title, "Dark Mode Coming to GitHub After 7 Years");
        assert_eq!(
            feed.entries[0].content,
            r#"<p>submitted by <a href="/u/x">x</a></p>"#
        );
    }

    #[test]
    fn test_identity_falls_back_to_id_element() {
        let feed = canonical(
            r#"<feed><id>tag:example.com,2024:feed</id><title>T</title>
               <link rel="self" href="https://example.com/feed.atom"/></feed>"#,
        );
        assert_eq!(feed.id, "tag:example.com,2024:feed");
        assert_eq!(feed.link, "https://example.com/feed.atom");
    }

    #[test]
    fn test_entry_without_date_is_dropped() {
        let feed = canonical(
            r#"<feed><id>urn:x</id>
               <entry><id>1</id><updated>2024-01-01T00:00:00Z</updated></entry>
               <entry><id>2</id></entry>
               <entry><id>3</id><updated>not a date</updated></entry>
               <entry><id>4</id><published>2024-01-02T00:00:00Z</published></entry>
             </feed>"#,
        );
        let ids: Vec<_> = feed.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn test_summary_used_when_content_missing() {
        let feed = canonical(
            r#"<feed><id>urn:x</id><entry><id>1</id><updated>2024-01-01T00:00:00Z</updated>
               <summary>Short</summary></entry></feed>"#,
        );
        assert_eq!(feed.entries[0].content, "Short");
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let root = parse(b"<rss><channel/></rss>").unwrap();
        let err = AtomFeed::decode(&root).unwrap_err();
        assert!(matches!(err, DecodeError::UnexpectedRoot { expected: "feed", .. }));
    }

    #[test]
    fn test_feed_without_identity_fails() {
        let root = parse(b"<feed><title>Nothing</title></feed>").unwrap();
        let err = AtomFeed::decode(&root).unwrap().to_canonical_feed().unwrap_err();
        assert!(matches!(err, DecodeError::MissingId { .. }));
    }
}
