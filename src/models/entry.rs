use chrono::{DateTime, Utc};
use std::fmt;

use crate::entities::entries;

const SUMMARY_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: i32,
    pub topic_id: i32,
    pub text: String,
    pub date_added: DateTime<Utc>,
}

impl From<entries::Model> for Entry {
    fn from(model: entries::Model) -> Self {
        Self {
            id: model.id,
            topic_id: model.topic_id,
            text: model.text,
            date_added: model.date_added,
        }
    }
}

impl Entry {
    /// First 50 characters of the text, used in titles and log lines.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.text.chars().count() <= SUMMARY_CHARS {
            return self.text.clone();
        }
        let head: String = self.text.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> Entry {
        Entry {
            id: 1,
            topic_id: 1,
            text: text.to_string(),
            date_added: Utc::now(),
        }
    }

    #[test]
    fn summary_keeps_short_text() {
        assert_eq!(entry("Chess openings").summary(), "Chess openings");
    }

    #[test]
    fn summary_truncates_on_char_boundary() {
        let text = "é".repeat(60);
        let summary = entry(&text).summary();
        assert_eq!(summary.chars().count(), 53);
        assert!(summary.ends_with("..."));
    }
}
