//! Create user, vote, topic, category and promise tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::Subject).text().not_null())
                    .col(ColumnDef::new(Vote::Time).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Index: time (votes are listed chronologically)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_time")
                    .table(Vote::Table)
                    .col(Vote::Time)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Topic::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Topic::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Topic::Name).string_len(256).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Category::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Category::Name).string_len(256).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Promise::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Promise::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Promise::Body).text().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Promise::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Category::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Topic::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum User {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    Subject,
    Time,
}

#[derive(Iden)]
enum Topic {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Promise {
    Table,
    Id,
    Body,
}
