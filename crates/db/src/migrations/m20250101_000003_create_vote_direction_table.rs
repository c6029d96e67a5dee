//! Create vote_direction table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VoteDirection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteDirection::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteDirection::VoteId).integer().not_null())
                    .col(ColumnDef::new(VoteDirection::TopicId).integer().not_null())
                    .col(ColumnDef::new(VoteDirection::Matches).boolean().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_direction_vote")
                            .from(VoteDirection::Table, VoteDirection::VoteId)
                            .to(Vote::Table, Vote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_direction_topic")
                            .from(VoteDirection::Table, VoteDirection::TopicId)
                            .to(Topic::Table, Topic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vote_direction_topic_vote")
                    .table(VoteDirection::Table)
                    .col(VoteDirection::TopicId)
                    .col(VoteDirection::VoteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteDirection::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VoteDirection {
    Table,
    Id,
    VoteId,
    TopicId,
    Matches,
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
}
