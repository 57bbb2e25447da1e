use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::{entries, prelude::*};
use crate::models::Entry;

/// Repository for entry rows
pub struct EntryRepository {
    conn: DatabaseConnection,
}

impl EntryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, topic_id: i32, text: &str) -> Result<Entry> {
        let active = entries::ActiveModel {
            topic_id: Set(topic_id),
            text: Set(text.to_string()),
            date_added: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert entry")?;

        info!("Added entry {} to topic {}", model.id, topic_id);
        Ok(Entry::from(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Entry>> {
        let row = Entries::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query entry")?;

        Ok(row.map(Entry::from))
    }

    /// Entries of a topic, newest first.
    pub async fn list_for_topic(&self, topic_id: i32) -> Result<Vec<Entry>> {
        let rows = Entries::find()
            .filter(entries::Column::TopicId.eq(topic_id))
            .order_by_desc(entries::Column::DateAdded)
            .order_by_desc(entries::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list entries")?;

        Ok(rows.into_iter().map(Entry::from).collect())
    }

    /// Rewrites the text column only; id, topic and timestamp stay as stored.
    pub async fn update_text(&self, id: i32, text: &str) -> Result<bool> {
        let result = Entries::update_many()
            .col_expr(
                entries::Column::Text,
                sea_orm::sea_query::Expr::value(text),
            )
            .filter(entries::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update entry")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_all(&self) -> Result<u64> {
        Entries::find()
            .count(&self.conn)
            .await
            .context("Failed to count entries")
    }
}
