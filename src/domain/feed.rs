use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Entry;
use crate::normalizer::DecodeError;

/// A configured feed source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub disabled: bool,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            disabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Canonical feed, independent of the dialect it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub link: String,
    pub updated: Option<DateTime<Utc>>,
    pub entries: Vec<Entry>,
}

impl Feed {
    /// Builds a feed, refusing an empty identity.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        link: impl Into<String>,
        updated: Option<DateTime<Utc>>,
        entries: Vec<Entry>,
    ) -> Result<Self, DecodeError> {
        let id = id.into().trim().to_string();
        let title = title.into();
        if id.is_empty() {
            return Err(DecodeError::MissingId { title });
        }

        Ok(Self {
            id,
            title,
            link: link.into(),
            updated,
            entries,
        })
    }

    /// Copy of this feed's metadata carrying the given entries.
    pub fn with_entries(&self, entries: Vec<Entry>) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            link: self.link.clone(),
            updated: self.updated,
            entries,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// A source that could not be turned into a feed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSource {
    pub name: String,
    pub url: String,
    pub reason: String,
}

impl FailedSource {
    pub fn new(source: &FeedSource, reason: impl ToString) -> Self {
        Self {
            name: source.name.clone(),
            url: source.url.clone(),
            reason: reason.to_string(),
        }
    }
}
