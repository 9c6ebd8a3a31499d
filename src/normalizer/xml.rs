//! Minimal element tree over quick-xml events.
//!
//! Feed dialects only ever need "children with this local name", attributes
//! and text, so documents are read into a small owned tree instead of being
//! deserialized straight into dialect structs. Namespace prefixes are
//! dropped: `atom:link`, `dc:date` and `media:group` are addressed as
//! `link`, `date` and `group`.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use html_escape::decode_html_entities;
use quick_xml::errors::SyntaxError;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// The input ended before the document did.
    #[error("unexpected end of input: {0}")]
    Truncated(String),

    #[error("malformed xml: {0}")]
    Malformed(String),

    #[error("document has no root element")]
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let attrs = start
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = match attr.unescape_value() {
                    Ok(v) => v.into_owned(),
                    Err(_) => decode_html_entities(&String::from_utf8_lossy(&attr.value)).into_owned(),
                };
                (key, value)
            })
            .collect();

        Self {
            name,
            attrs,
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Trimmed character data of this element.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text of the first child called `name`, if that child exists.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(Element::text)
    }

    /// Like [`Element::child_text`], but empty text counts as absent.
    pub fn child_text_nonempty(&self, name: &str) -> Option<&str> {
        self.child_text(name).filter(|t| !t.is_empty())
    }
}

/// Decodes `bytes` to UTF-8 honouring a BOM or the encoding named in the XML
/// declaration. Unknown labels fall back to UTF-8.
pub fn transcode(bytes: &[u8]) -> Cow<'_, str> {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);

    if encoding != UTF_8 {
        tracing::debug!("transcoding feed from {}", encoding.name());
    }

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!("replaced malformed {} sequences", encoding.name());
    }
    text
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let decl = head.trim_start().strip_prefix("<?xml")?;
    let decl = &decl[..decl.find("?>")?];

    let rest = &decl[decl.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let label = &rest[..rest.find(quote)?];

    // A document we could read this far as ASCII cannot really be UTF-16.
    Encoding::for_label(label.trim().as_bytes()).filter(|enc| enc.is_ascii_compatible())
}

/// Parses the first root element of the document.
///
/// Anything after the root element is ignored. Running out of input while
/// elements are still open is reported as [`XmlError::Truncated`].
pub fn parse(bytes: &[u8]) -> Result<Element, XmlError> {
    let text = transcode(bytes);
    let mut reader = Reader::from_str(&text);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Element::open(&start)),
            Ok(Event::Empty(start)) => {
                let element = Element::open(&start);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(XmlError::Malformed(format!(
                        "unmatched end tag at position {}",
                        reader.buffer_position()
                    )));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&unescape_text(&text));
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(quick_xml::Error::Syntax(e)) if ends_early(&e) => {
                return Err(XmlError::Truncated(e.to_string()));
            }
            Err(e) => {
                return Err(XmlError::Malformed(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )));
            }
        }
    }

    match stack.last() {
        Some(open) => Err(XmlError::Truncated(format!(
            "element <{}> is never closed",
            open.name
        ))),
        None => Err(XmlError::Empty),
    }
}

/// Syntax errors quick-xml raises when the input stops inside markup.
fn ends_early(e: &SyntaxError) -> bool {
    matches!(
        e,
        SyntaxError::UnclosedTag
            | SyntaxError::UnclosedComment
            | SyntaxError::UnclosedCData
            | SyntaxError::UnclosedDoctype
            | SyntaxError::UnclosedPIOrXmlDecl
    )
}

/// XML entities first; HTML named entities (`&nbsp;`) that strict XML
/// rejects are decoded leniently.
fn unescape_text(text: &BytesText<'_>) -> String {
    match text.unescape() {
        Ok(s) => s.into_owned(),
        Err(_) => decode_html_entities(&String::from_utf8_lossy(text)).into_owned(),
    }
}
