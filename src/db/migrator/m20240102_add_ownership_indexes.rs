use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_topics_owner_date_added")
                    .table(Topics::Table)
                    .col(Topics::OwnerId)
                    .col(Topics::DateAdded)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_topic_date_added")
                    .table(Entries::Table)
                    .col(Entries::TopicId)
                    .col(Entries::DateAdded)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_entries_topic_date_added")
                    .table(Entries::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_topics_owner_date_added")
                    .table(Topics::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Topics {
    Table,
    OwnerId,
    DateAdded,
}

#[derive(DeriveIden)]
enum Entries {
    Table,
    TopicId,
    DateAdded,
}
