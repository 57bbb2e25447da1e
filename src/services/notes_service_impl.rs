//! `SeaORM` implementation of the `NotesService` trait.

use crate::db::Store;
use crate::forms::{EntryForm, TopicForm};
use crate::models::{Entry, Topic, TopicPage, User};
use crate::services::access::{OwnedEntry, fetch_owned};
use crate::services::notes_service::{NotesError, NotesService};
use async_trait::async_trait;
use tracing::info;

pub struct SeaOrmNotesService {
    store: Store,
}

impl SeaOrmNotesService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotesService for SeaOrmNotesService {
    async fn list_topics(&self, owner: &User) -> Result<Vec<Topic>, NotesError> {
        Ok(self.store.list_topics_for_owner(owner.id).await?)
    }

    async fn topic_page(&self, owner: &User, topic_id: i32) -> Result<TopicPage, NotesError> {
        let topic: Topic = fetch_owned(&self.store, topic_id, owner).await?;
        let entries = self.store.list_entries_for_topic(topic.id).await?;

        Ok(TopicPage { topic, entries })
    }

    async fn create_topic(&self, owner: &User, form: &TopicForm) -> Result<Topic, NotesError> {
        let text = form.validate()?;
        let topic = self.store.add_topic(owner.id, &text).await?;

        info!(user_id = owner.id, topic_id = topic.id, "Topic created: {topic}");
        Ok(topic)
    }

    async fn topic_for_new_entry(
        &self,
        owner: &User,
        topic_id: i32,
    ) -> Result<Topic, NotesError> {
        fetch_owned(&self.store, topic_id, owner).await
    }

    async fn create_entry(
        &self,
        owner: &User,
        topic_id: i32,
        form: &EntryForm,
    ) -> Result<Entry, NotesError> {
        let topic: Topic = fetch_owned(&self.store, topic_id, owner).await?;
        let text = form.validate()?;
        let entry = self.store.add_entry(topic.id, &text).await?;

        info!(
            user_id = owner.id,
            topic_id = topic.id,
            entry_id = entry.id,
            "Entry created: {entry}"
        );
        Ok(entry)
    }

    async fn entry_for_edit(
        &self,
        owner: &User,
        entry_id: i32,
    ) -> Result<(Entry, Topic), NotesError> {
        let owned: OwnedEntry = fetch_owned(&self.store, entry_id, owner).await?;
        Ok((owned.entry, owned.topic))
    }

    async fn update_entry(
        &self,
        owner: &User,
        entry_id: i32,
        form: &EntryForm,
    ) -> Result<(Entry, Topic), NotesError> {
        let owned: OwnedEntry = fetch_owned(&self.store, entry_id, owner).await?;
        let text = form.validate()?;

        if !self.store.update_entry_text(owned.entry.id, &text).await? {
            return Err(NotesError::NotFound);
        }

        let entry = Entry {
            text,
            ..owned.entry
        };
        info!(user_id = owner.id, entry_id = entry.id, "Entry updated");
        Ok((entry, owned.topic))
    }
}
