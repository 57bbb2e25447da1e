use crate::config::SecurityConfig;
use crate::models::{Entry, Topic, User};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// The sqlx pool underneath the ORM, shared with the session store.
    #[must_use]
    pub fn sqlite_pool(&self) -> &sea_orm::sqlx::SqlitePool {
        self.conn.get_sqlite_connection_pool()
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn topic_repo(&self) -> repositories::topic::TopicRepository {
        repositories::topic::TopicRepository::new(self.conn.clone())
    }

    fn entry_repo(&self) -> repositories::entry::EntryRepository {
        repositories::entry::EntryRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(username, password, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo()
            .verify_password(username, password, security)
            .await
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().touch_last_login(id).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    // ========== Topics ==========

    pub async fn add_topic(&self, owner_id: i32, text: &str) -> Result<Topic> {
        self.topic_repo().add(owner_id, text).await
    }

    pub async fn get_topic(&self, id: i32) -> Result<Option<Topic>> {
        self.topic_repo().get(id).await
    }

    pub async fn list_topics_for_owner(&self, owner_id: i32) -> Result<Vec<Topic>> {
        self.topic_repo().list_for_owner(owner_id).await
    }

    pub async fn count_topics_for_owner(&self, owner_id: i32) -> Result<u64> {
        self.topic_repo().count_for_owner(owner_id).await
    }

    pub async fn count_topics(&self) -> Result<u64> {
        self.topic_repo().count_all().await
    }

    // ========== Entries ==========

    pub async fn add_entry(&self, topic_id: i32, text: &str) -> Result<Entry> {
        self.entry_repo().add(topic_id, text).await
    }

    pub async fn get_entry(&self, id: i32) -> Result<Option<Entry>> {
        self.entry_repo().get(id).await
    }

    pub async fn list_entries_for_topic(&self, topic_id: i32) -> Result<Vec<Entry>> {
        self.entry_repo().list_for_topic(topic_id).await
    }

    pub async fn update_entry_text(&self, id: i32, text: &str) -> Result<bool> {
        self.entry_repo().update_text(id, text).await
    }

    pub async fn count_entries(&self) -> Result<u64> {
        self.entry_repo().count_all().await
    }
}
