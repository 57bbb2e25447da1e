use chrono::{DateTime, Utc};
use std::fmt;

use super::Entry;
use crate::entities::topics;

/// Maximum length of a topic name, in characters.
pub const TOPIC_TEXT_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: i32,
    pub text: String,
    pub date_added: DateTime<Utc>,
    pub owner_id: i32,
}

impl From<topics::Model> for Topic {
    fn from(model: topics::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            date_added: model.date_added,
            owner_id: model.owner_id,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A topic together with its entries, newest first.
#[derive(Debug, Clone)]
pub struct TopicPage {
    pub topic: Topic,
    pub entries: Vec<Entry>,
}
