use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical feed entry.
///
/// `updated` is mandatory: adapters drop entries whose timestamp cannot be
/// parsed rather than inventing one. `content` is an HTML fragment and is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub link: String,
    pub id: String,
    pub updated: DateTime<Utc>,
    pub content: String,
}

impl Entry {
    pub fn new(id: impl Into<String>, updated: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            link: String::new(),
            id: id.into(),
            updated,
            content: String::new(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_title_with_title() {
        let mut entry = Entry::new("e1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        entry.title = "My Article".into();
        assert_eq!(entry.display_title(), "My Article");
    }

    #[test]
    fn test_display_title_without_title() {
        let entry = Entry::new("e1", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(entry.display_title(), "(Untitled)");
    }
}
