//! Create issue, issue association and vote_connection tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issue::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issue::Title).string_len(512).not_null().unique_key())
                    .col(ColumnDef::new(Issue::Description).text())
                    .col(ColumnDef::new(Issue::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Issue::Slug).string_len(512).not_null().unique_key())
                    .col(ColumnDef::new(Issue::LastUpdatedById).integer())
                    .col(
                        ColumnDef::new(Issue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Issue::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_last_updated_by")
                            .from(Issue::Table, Issue::LastUpdatedById)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: published (for the published scope)
        manager
            .create_index(
                Index::create()
                    .name("idx_issue_published")
                    .table(Issue::Table)
                    .col(Issue::Published)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssueTopic::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IssueTopic::IssueId).integer().not_null())
                    .col(ColumnDef::new(IssueTopic::TopicId).integer().not_null())
                    .primary_key(Index::create().col(IssueTopic::IssueId).col(IssueTopic::TopicId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_topic_issue")
                            .from(IssueTopic::Table, IssueTopic::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_topic_topic")
                            .from(IssueTopic::Table, IssueTopic::TopicId)
                            .to(Topic::Table, Topic::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssueCategory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IssueCategory::IssueId).integer().not_null())
                    .col(ColumnDef::new(IssueCategory::CategoryId).integer().not_null())
                    .primary_key(Index::create().col(IssueCategory::IssueId).col(IssueCategory::CategoryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_category_issue")
                            .from(IssueCategory::Table, IssueCategory::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_category_category")
                            .from(IssueCategory::Table, IssueCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssuePromise::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IssuePromise::IssueId).integer().not_null())
                    .col(ColumnDef::new(IssuePromise::PromiseId).integer().not_null())
                    .primary_key(Index::create().col(IssuePromise::IssueId).col(IssuePromise::PromiseId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_promise_issue")
                            .from(IssuePromise::Table, IssuePromise::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_promise_promise")
                            .from(IssuePromise::Table, IssuePromise::PromiseId)
                            .to(Promise::Table, Promise::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VoteConnection::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VoteConnection::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VoteConnection::VoteId).integer().not_null())
                    .col(ColumnDef::new(VoteConnection::IssueId).integer().not_null())
                    .col(ColumnDef::new(VoteConnection::Matches).boolean().not_null())
                    .col(
                        ColumnDef::new(VoteConnection::Data)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_connection_vote")
                            .from(VoteConnection::Table, VoteConnection::VoteId)
                            .to(Vote::Table, Vote::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_connection_issue")
                            .from(VoteConnection::Table, VoteConnection::IssueId)
                            .to(Issue::Table, Issue::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (issue_id, vote_id) - looked up before every create
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_connection_issue_vote")
                    .table(VoteConnection::Table)
                    .col(VoteConnection::IssueId)
                    .col(VoteConnection::VoteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VoteConnection::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IssuePromise::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IssueCategory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IssueTopic::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Issue::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Issue {
    Table,
    Id,
    Title,
    Description,
    Published,
    Slug,
    LastUpdatedById,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum IssueTopic {
    Table,
    IssueId,
    TopicId,
}

#[derive(Iden)]
enum IssueCategory {
    Table,
    IssueId,
    CategoryId,
}

#[derive(Iden)]
enum IssuePromise {
    Table,
    IssueId,
    PromiseId,
}

#[derive(Iden)]
enum VoteConnection {
    Table,
    Id,
    VoteId,
    IssueId,
    Matches,
    Data,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
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

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum Promise {
    Table,
    Id,
}
