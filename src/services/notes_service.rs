//! Domain service for topics and entries.
//!
//! Every operation takes the authenticated [`User`] and goes through the
//! ownership guard in [`crate::services::access`]. Owner and topic
//! references are always taken from that user and the request path, never
//! from submitted form data.

use thiserror::Error;

use crate::forms::{EntryForm, FormErrors, TopicForm};
use crate::models::{Entry, Topic, TopicPage, User};

/// Errors specific to note operations.
#[derive(Debug, Error)]
pub enum NotesError {
    /// Missing, or owned by another user.
    #[error("Not found")]
    NotFound,

    #[error("Invalid form data")]
    Invalid(FormErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for NotesError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for NotesError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<FormErrors> for NotesError {
    fn from(errors: FormErrors) -> Self {
        Self::Invalid(errors)
    }
}

#[async_trait::async_trait]
pub trait NotesService: Send + Sync {
    /// Topics owned by `owner`, oldest first.
    async fn list_topics(&self, owner: &User) -> Result<Vec<Topic>, NotesError>;

    /// One owned topic with its entries, newest first.
    async fn topic_page(&self, owner: &User, topic_id: i32) -> Result<TopicPage, NotesError>;

    /// Creates a topic owned by `owner`.
    async fn create_topic(&self, owner: &User, form: &TopicForm) -> Result<Topic, NotesError>;

    /// Resolves the topic a new entry would be attached to.
    async fn topic_for_new_entry(&self, owner: &User, topic_id: i32)
    -> Result<Topic, NotesError>;

    /// Creates an entry under the topic named by `topic_id`.
    async fn create_entry(
        &self,
        owner: &User,
        topic_id: i32,
        form: &EntryForm,
    ) -> Result<Entry, NotesError>;

    /// Loads an owned entry and its topic for editing.
    async fn entry_for_edit(&self, owner: &User, entry_id: i32)
    -> Result<(Entry, Topic), NotesError>;

    /// Replaces the text of an owned entry and returns the stored result.
    async fn update_entry(
        &self,
        owner: &User,
        entry_id: i32,
        form: &EntryForm,
    ) -> Result<(Entry, Topic), NotesError>;
}
