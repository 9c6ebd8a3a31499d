//! Link elements in both of their shapes.
//!
//! RSS writes `<link>https://example.com/</link>`, Atom writes
//! `<link rel="alternate" type="text/html" href="https://example.com/"/>`,
//! and RSS feeds carrying an `atom:link` mix the two within one channel.

use thiserror::Error;
use url::Url;

use crate::normalizer::xml::Element;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("found no href content in <{element}> element")]
    NoHref { element: String },

    #[error("could not parse link href={href:?}: {reason}")]
    InvalidHref { href: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    pub media_type: Option<String>,
}

impl Link {
    /// Reads a link from element text first, then from its `href` attribute.
    pub fn resolve(element: &Element) -> Result<Self, LinkError> {
        let rel = element.attr("rel").map(str::to_string);
        let media_type = element.attr("type").map(str::to_string);

        let text = element.text();
        if check_request_uri(text).is_ok() {
            return Ok(Self {
                href: text.to_string(),
                rel,
                media_type,
            });
        }

        let href = element.attr("href").map(str::trim).unwrap_or_default();
        if href.is_empty() {
            return Err(LinkError::NoHref {
                element: element.name.clone(),
            });
        }

        check_request_uri(href).map_err(|reason| LinkError::InvalidHref {
            href: href.to_string(),
            reason,
        })?;

        Ok(Self {
            href: href.to_string(),
            rel,
            media_type,
        })
    }

    /// Resolves every child of `parent` named `link`.
    pub fn resolve_all(parent: &Element) -> Result<Vec<Self>, LinkError> {
        parent.children_named("link").map(Self::resolve).collect()
    }

    pub fn is_self(&self) -> bool {
        self.rel.as_deref() == Some("self")
    }

    pub fn is_alternate(&self) -> bool {
        self.rel.as_deref() == Some("alternate") || self.media_type.as_deref() == Some("text/html")
    }
}

/// Human-facing link: an alternate/html link, else the first one.
pub fn alternate(links: &[Link]) -> Option<&Link> {
    links.iter().find(|l| l.is_alternate()).or_else(|| links.first())
}

/// Identity link: `rel="self"`, else the first one.
pub fn self_link(links: &[Link]) -> Option<&Link> {
    links.iter().find(|l| l.is_self()).or_else(|| links.first())
}

pub fn first_non_self(links: &[Link]) -> Option<&Link> {
    links.iter().find(|l| !l.is_self())
}

/// Accepts absolute URLs and absolute paths, the two request-URI forms.
fn check_request_uri(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("empty url".to_string());
    }
    if s.starts_with('/') {
        return Ok(());
    }
    Url::parse(s).map(|_| ()).map_err(|e| e.to_string())
}
