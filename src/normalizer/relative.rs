//! Rewrites relative `img src` and `a href` values in entry content.
//!
//! Mail clients have no base URL, so `/images/x.jpg` in a feed entry is
//! useless once the entry leaves the feed.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use url::Url;

use crate::domain::Feed;

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)(<(?:img|a)\b[^>]*?\s(?:src|href)\s*=\s*)(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#,
        )
        .expect("attribute pattern is valid")
    })
}

/// Resolves relative `src`/`href` attribute values of `img` and `a` tags
/// against `base`. Absolute and unresolvable values are left as they are.
pub fn absolutify(html: &str, base: &Url) -> String {
    attribute_pattern()
        .replace_all(html, |caps: &Captures<'_>| {
            let (value, quote) = match (caps.get(2), caps.get(3), caps.get(4)) {
                (Some(v), _, _) => (v.as_str(), "\""),
                (None, Some(v), _) => (v.as_str(), "'"),
                (None, None, Some(v)) => (v.as_str(), ""),
                (None, None, None) => return caps[0].to_string(),
            };
            let resolved = resolve(value, base);
            format!("{}{quote}{resolved}{quote}", &caps[1])
        })
        .into_owned()
}

fn resolve(value: &str, base: &Url) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || Url::parse(trimmed).is_ok() {
        return value.to_string();
    }
    match base.join(trimmed) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!("ignoring url parse error for {:?}: {}", value, e);
            value.to_string()
        }
    }
}

/// Applies [`absolutify`] to every entry, using the feed's link as base.
pub fn absolutify_feed(feed: &mut Feed) {
    let base = match Url::parse(&feed.link) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!(
                "ignoring url parse error when replacing relative urls for {:?}: {}",
                feed.link,
                e
            );
            return;
        }
    };

    for entry in &mut feed.entries {
        entry.content = absolutify(&entry.content, &base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entry;
    use chrono::Utc;

    #[test]
    fn test_relative_image_src() {
        let base = Url::parse("http://kottke.org/").unwrap();
        let html = r#"<p><img src="/plus/misc/images/her-soundtrack.jpg" alt="her"></p>"#;
        let out = absolutify(html, &base);
        assert!(out.contains(r#"src="http://kottke.org/plus/misc/images/her-soundtrack.jpg""#));
    }

    #[test]
    fn test_relative_anchor_href() {
        let base = Url::parse("https://github.com/").unwrap();
        let html = r#"<a class="user" href='/bradfitz'>bradfitz</a> pushed"#;
        let out = absolutify(html, &base);
        assert!(out.contains("href='https://github.com/bradfitz'"));
        assert!(!out.contains("href='/bradfitz'"));
    }

    #[test]
    fn test_unquoted_attribute_values() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let html = r#"<p><img src=/a.png alt=a> <a href=/b>b</a> <a href=c.html>c</a></p>"#;
        let out = absolutify(html, &base);
        assert_eq!(
            out,
            concat!(
                r#"<p><img src=https://example.com/a.png alt=a> "#,
                r#"<a href=https://example.com/b>b</a> "#,
                r#"<a href=https://example.com/blog/c.html>c</a></p>"#,
            )
        );
    }

    #[test]
    fn test_absolute_and_other_tags_untouched() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let html = concat!(
            r#"<a href="https://other.org/x">x</a>"#,
            r#"<link href="/style.css">"#,
            r#"<abbr title="/t">t</abbr>"#,
        );
        assert_eq!(absolutify(html, &base), html);
    }

    #[test]
    fn test_path_relative_to_base_directory() {
        let base = Url::parse("https://example.com/blog/").unwrap();
        let out = absolutify(r#"<IMG SRC="pic.png">"#, &base);
        assert_eq!(out, r#"<IMG SRC="https://example.com/blog/pic.png">"#);
    }

    #[test]
    fn test_absolutify_feed_skips_unparseable_base() {
        let mut entry = Entry::new("1", Utc::now());
        entry.content = r#"<img src="/a.png">"#.into();
        let mut feed = Feed::new("id", "t", "not a url", None, vec![entry]).unwrap();

        absolutify_feed(&mut feed);
        assert_eq!(feed.entries[0].content, r#"<img src="/a.png">"#);
    }
}
