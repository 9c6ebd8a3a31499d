//! Decoding of Atom, RSS 2.0 and RDF documents into [`Feed`]s.

pub mod atom;
pub mod link;
pub mod rdf;
pub mod relative;
pub mod rss;
pub mod time;
pub mod xml;

use thiserror::Error;

use crate::domain::Feed;
use crate::normalizer::atom::AtomFeed;
use crate::normalizer::link::LinkError;
use crate::normalizer::rdf::RdfFeed;
use crate::normalizer::rss::RssFeed;
use crate::normalizer::xml::{Element, XmlError};

pub use time::parse_time;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error(transparent)]
    Xml(#[from] XmlError),

    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("missing <{element}> element in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    #[error("failed to convert rss feed {title:?}, missing link")]
    MissingLink { title: String },

    #[error("feed {title:?} has no usable identity")]
    MissingId { title: String },

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("failed to decode feed as atom [{atom}], as rss [{rss}], as rdf [{rdf}]")]
    Unrecognized {
        atom: String,
        rss: String,
        rdf: String,
    },
}

impl DecodeError {
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Xml(XmlError::Truncated(_)))
    }
}

/// Conversion of a decoded dialect document into the canonical model.
pub trait ToCanonicalFeed {
    fn to_canonical_feed(&self) -> Result<Feed, DecodeError>;
}

/// The supported feed dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Atom,
    Rss,
    Rdf,
}

impl Dialect {
    /// Order in which dialects are attempted.
    pub const PRIORITY: [Dialect; 3] = [Dialect::Atom, Dialect::Rss, Dialect::Rdf];

    pub fn decode(self, root: &Element) -> Result<Feed, DecodeError> {
        match self {
            Dialect::Atom => AtomFeed::decode(root)?.to_canonical_feed(),
            Dialect::Rss => RssFeed::decode(root)?.to_canonical_feed(),
            Dialect::Rdf => RdfFeed::decode(root)?.to_canonical_feed(),
        }
    }
}

/// Decodes a raw feed document.
///
/// Returns `Ok(None)` when the document was cut off mid-way: sources that
/// intermittently truncate responses are skipped rather than reported.
pub fn detect(bytes: &[u8]) -> Result<Option<Feed>, DecodeError> {
    let tree = xml::parse(bytes).map_err(DecodeError::from);

    // Dialects are told apart by their root element, so at most one attempt
    // gets past its first check.
    let [atom, rss, rdf] = Dialect::PRIORITY.map(|dialect| {
        tree.as_ref()
            .map_err(Clone::clone)
            .and_then(|root| dialect.decode(root))
    });
    let (atom, rss, rdf) = match (atom, rss, rdf) {
        (Ok(feed), _, _) | (Err(_), Ok(feed), _) | (Err(_), Err(_), Ok(feed)) => {
            return Ok(Some(feed));
        }
        (Err(atom), Err(rss), Err(rdf)) => (atom, rss, rdf),
    };

    tracing::debug!(
        "failed to unmarshal feed for atom err=[{}] for rss err=[{}] for rdf err=[{}]",
        atom,
        rss,
        rdf
    );

    if rdf.is_truncated() {
        tracing::info!("ignoring truncated feed document: {}", rdf);
        return Ok(None);
    }

    Err(DecodeError::Unrecognized {
        atom: atom.to_string(),
        rss: rss.to_string(),
        rdf: rdf.to_string(),
    })
}

#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, body: &[u8]) -> Result<Option<Feed>, DecodeError> {
        detect(body)
    }
}
