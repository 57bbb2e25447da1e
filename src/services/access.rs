//! Ownership guard shared by every handler that reads or writes a topic or
//! an entry.
//!
//! A resource that does not exist and a resource owned by someone else both
//! come back as [`NotesError::NotFound`], so a response never reveals whether
//! another user's record exists.

use async_trait::async_trait;
use tracing::debug;

use crate::db::Store;
use crate::models::{Entry, Topic, User};
use crate::services::notes_service::NotesError;

/// A stored record whose visibility is decided by one owning user.
#[async_trait]
pub trait OwnedResource: Sized + Send {
    const KIND: &'static str;

    async fn load(store: &Store, id: i32) -> anyhow::Result<Option<Self>>;

    fn owner_id(&self) -> i32;
}

#[async_trait]
impl OwnedResource for Topic {
    const KIND: &'static str = "topic";

    async fn load(store: &Store, id: i32) -> anyhow::Result<Option<Self>> {
        store.get_topic(id).await
    }

    fn owner_id(&self) -> i32 {
        self.owner_id
    }
}

/// An entry joined with its parent topic; the topic's owner owns the entry.
#[derive(Debug, Clone)]
pub struct OwnedEntry {
    pub entry: Entry,
    pub topic: Topic,
}

#[async_trait]
impl OwnedResource for OwnedEntry {
    const KIND: &'static str = "entry";

    async fn load(store: &Store, id: i32) -> anyhow::Result<Option<Self>> {
        let Some(entry) = store.get_entry(id).await? else {
            return Ok(None);
        };
        let topic = store
            .get_topic(entry.topic_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Entry {id} references missing topic"))?;

        Ok(Some(Self { entry, topic }))
    }

    fn owner_id(&self) -> i32 {
        self.topic.owner_id
    }
}

/// Loads `R` by id and hands it back only if `user` owns it.
pub async fn fetch_owned<R: OwnedResource>(
    store: &Store,
    id: i32,
    user: &User,
) -> Result<R, NotesError> {
    let resource = R::load(store, id).await?;
    check_owner(resource, id, user)
}

/// The decision half of [`fetch_owned`], separate so it can be tested
/// without a database.
pub fn check_owner<R: OwnedResource>(
    resource: Option<R>,
    id: i32,
    user: &User,
) -> Result<R, NotesError> {
    match resource {
        Some(resource) if resource.owner_id() == user.id => Ok(resource),
        Some(_) => {
            debug!(kind = R::KIND, id, user_id = user.id, "ownership check failed");
            Err(NotesError::NotFound)
        }
        None => Err(NotesError::NotFound),
    }
}
