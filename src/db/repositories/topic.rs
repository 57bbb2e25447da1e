use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::{prelude::*, topics};
use crate::models::Topic;

/// Repository for topic rows
pub struct TopicRepository {
    conn: DatabaseConnection,
}

impl TopicRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, owner_id: i32, text: &str) -> Result<Topic> {
        let active = topics::ActiveModel {
            text: Set(text.to_string()),
            date_added: Set(chrono::Utc::now()),
            owner_id: Set(owner_id),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert topic")?;

        info!("Added topic {} for user {}", model.id, owner_id);
        Ok(Topic::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Topic>> {
        let row = Topics::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query topic")?;

        Ok(row.map(Topic::from))
    }

    /// Topics owned by `owner_id`, oldest first. The owner filter is part of
    /// the query so other users' rows are never loaded.
    pub async fn list_for_owner(&self, owner_id: i32) -> Result<Vec<Topic>> {
        let rows = Topics::find()
            .filter(topics::Column::OwnerId.eq(owner_id))
            .order_by_asc(topics::Column::DateAdded)
            .order_by_asc(topics::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list topics")?;

        Ok(rows.into_iter().map(Topic::from).collect())
    }

    pub async fn count_for_owner(&self, owner_id: i32) -> Result<u64> {
        Topics::find()
            .filter(topics::Column::OwnerId.eq(owner_id))
            .count(&self.conn)
            .await
            .context("Failed to count topics")
    }

    pub async fn count_all(&self) -> Result<u64> {
        Topics::find()
            .count(&self.conn)
            .await
            .context("Failed to count topics")
    }
}
