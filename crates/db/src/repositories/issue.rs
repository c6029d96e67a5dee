//! Issue repository.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::entities::{
    issue, issue_category, issue_promise, issue_topic, vote, vote_connection, Issue,
    IssueCategory, IssuePromise, IssueTopic, Vote,
};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, sea_query::Expr, ActiveModelTrait, ColumnTrait,
    DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

/// The many-to-many associations an issue carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueAssociation {
    Topics,
    Categories,
    Promises,
}

impl IssueAssociation {
    /// Attribute name callers use for the id list.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Topics => "topic_ids",
            Self::Categories => "category_ids",
            Self::Promises => "promise_ids",
        }
    }
}

/// Issue repository for database operations.
#[derive(Clone)]
pub struct IssueRepository {
    db: Arc<DatabaseConnection>,
}

impl IssueRepository {
    /// Create a new issue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an issue by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<issue::Model>> {
        Issue::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an issue by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<issue::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::IssueNotFound(id))
    }

    /// Find an issue by its slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<issue::Model>> {
        Issue::find()
            .filter(issue::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether another issue already uses this title.
    pub async fn title_taken(&self, title: &str, except_id: Option<i32>) -> AppResult<bool> {
        let mut query = Issue::find().filter(issue::Column::Title.eq(title));
        if let Some(id) = except_id {
            query = query.filter(issue::Column::Id.ne(id));
        }

        let existing = query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(existing.is_some())
    }

    /// List published issues, newest first.
    pub async fn find_published(&self) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .filter(issue::Column::Published.eq(true))
            .order_by_desc(issue::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List issues ordered by their most recent vote, latest first.
    ///
    /// Issues without any connected votes come last.
    pub async fn find_vote_ordered(&self) -> AppResult<Vec<issue::Model>> {
        let mut rows = Issue::find()
            .find_with_related(Vote)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.sort_by_key(|(issue, votes)| {
            let latest = votes.iter().map(|v| v.time).max();
            (Reverse(latest), issue.id)
        });

        Ok(rows.into_iter().map(|(issue, _)| issue).collect())
    }

    /// Votes connected to an issue, ordered by vote time ascending.
    pub async fn find_votes(&self, issue_id: i32) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .join(JoinType::InnerJoin, vote::Relation::VoteConnection.def())
            .filter(vote_connection::Column::IssueId.eq(issue_id))
            .order_by_asc(vote::Column::Time)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new issue.
    pub async fn create(&self, model: issue::ActiveModel) -> AppResult<issue::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an issue.
    pub async fn update(&self, model: issue::ActiveModel) -> AppResult<issue::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the modification timestamp without changing anything else.
    pub async fn touch(&self, id: i32, at: DateTimeWithTimeZone) -> AppResult<()> {
        Issue::update_many()
            .col_expr(issue::Column::UpdatedAt, Expr::value(at))
            .filter(issue::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an issue along with its join rows and vote connections.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        vote_connection::Entity::delete_many()
            .filter(vote_connection::Column::IssueId.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for association in [
            IssueAssociation::Topics,
            IssueAssociation::Categories,
            IssueAssociation::Promises,
        ] {
            self.clear_association(association, id).await?;
        }

        Issue::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Sorted ids currently linked through an association.
    pub async fn association_ids(
        &self,
        association: IssueAssociation,
        issue_id: i32,
    ) -> AppResult<Vec<i32>> {
        let mut ids = match association {
            IssueAssociation::Topics => IssueTopic::find()
                .filter(issue_topic::Column::IssueId.eq(issue_id))
                .all(self.db.as_ref())
                .await
                .map(|rows| rows.into_iter().map(|r| r.topic_id).collect::<Vec<_>>()),
            IssueAssociation::Categories => IssueCategory::find()
                .filter(issue_category::Column::IssueId.eq(issue_id))
                .all(self.db.as_ref())
                .await
                .map(|rows| rows.into_iter().map(|r| r.category_id).collect::<Vec<_>>()),
            IssueAssociation::Promises => IssuePromise::find()
                .filter(issue_promise::Column::IssueId.eq(issue_id))
                .all(self.db.as_ref())
                .await
                .map(|rows| rows.into_iter().map(|r| r.promise_id).collect::<Vec<_>>()),
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        ids.sort_unstable();
        Ok(ids)
    }

    /// Replace the ids linked through an association.
    pub async fn replace_association_ids(
        &self,
        association: IssueAssociation,
        issue_id: i32,
        ids: &[i32],
    ) -> AppResult<()> {
        self.clear_association(association, issue_id).await?;

        if ids.is_empty() {
            return Ok(());
        }

        let result = match association {
            IssueAssociation::Topics => {
                IssueTopic::insert_many(ids.iter().map(|&topic_id| issue_topic::ActiveModel {
                    issue_id: Set(issue_id),
                    topic_id: Set(topic_id),
                }))
                .exec_without_returning(self.db.as_ref())
                .await
            }
            IssueAssociation::Categories => IssueCategory::insert_many(ids.iter().map(
                |&category_id| issue_category::ActiveModel {
                    issue_id: Set(issue_id),
                    category_id: Set(category_id),
                },
            ))
            .exec_without_returning(self.db.as_ref())
            .await,
            IssueAssociation::Promises => IssuePromise::insert_many(ids.iter().map(
                |&promise_id| issue_promise::ActiveModel {
                    issue_id: Set(issue_id),
                    promise_id: Set(promise_id),
                },
            ))
            .exec_without_returning(self.db.as_ref())
            .await,
        };

        result.map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn clear_association(&self, association: IssueAssociation, issue_id: i32) -> AppResult<()> {
        let result = match association {
            IssueAssociation::Topics => {
                IssueTopic::delete_many()
                    .filter(issue_topic::Column::IssueId.eq(issue_id))
                    .exec(self.db.as_ref())
                    .await
            }
            IssueAssociation::Categories => {
                IssueCategory::delete_many()
                    .filter(issue_category::Column::IssueId.eq(issue_id))
                    .exec(self.db.as_ref())
                    .await
            }
            IssueAssociation::Promises => {
                IssuePromise::delete_many()
                    .filter(issue_promise::Column::IssueId.eq(issue_id))
                    .exec(self.db.as_ref())
                    .await
            }
        };

        result.map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_issue(id: i32, title: &str) -> issue::Model {
        issue::Model {
            id,
            title: title.to_string(),
            description: None,
            published: false,
            slug: hdo_common::slugify(title),
            last_updated_by_id: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let issue = create_test_issue(1, "Formuesskatt");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[issue.clone()]])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let result = repo.find_by_id(1).await.unwrap();

        assert_eq!(result.unwrap().title, "Formuesskatt");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<issue::Model>::new()])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let result = repo.get_by_id(7).await;

        assert!(matches!(result, Err(AppError::IssueNotFound(7))));
    }

    #[tokio::test]
    async fn test_title_taken() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_issue(2, "Bompenger")]])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        assert!(repo.title_taken("Bompenger", Some(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_association_ids_sorted() {
        let rows = vec![
            issue_category::Model {
                issue_id: 1,
                category_id: 9,
            },
            issue_category::Model {
                issue_id: 1,
                category_id: 3,
            },
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let ids = repo
            .association_ids(IssueAssociation::Categories, 1)
            .await
            .unwrap();

        assert_eq!(ids, vec![3, 9]);
    }

    #[tokio::test]
    async fn test_replace_with_empty_only_clears() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = IssueRepository::new(db);
        let result = repo
            .replace_association_ids(IssueAssociation::Topics, 1, &[])
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(IssueAssociation::Categories.field_name(), "category_ids");
        assert_eq!(IssueAssociation::Promises.field_name(), "promise_ids");
        assert_eq!(IssueAssociation::Topics.field_name(), "topic_ids");
    }
}
