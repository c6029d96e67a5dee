//! Vote connection repository.

use std::sync::Arc;

use crate::entities::{vote_connection, VoteConnection};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Vote connection repository for database operations.
#[derive(Clone)]
pub struct VoteConnectionRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteConnectionRepository {
    /// Create a new vote connection repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the connection between an issue and a vote.
    pub async fn find_by_issue_and_vote(
        &self,
        issue_id: i32,
        vote_id: i32,
    ) -> AppResult<Option<vote_connection::Model>> {
        VoteConnection::find()
            .filter(vote_connection::Column::IssueId.eq(issue_id))
            .filter(vote_connection::Column::VoteId.eq(vote_id))
            .order_by_asc(vote_connection::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All connections for an issue.
    pub async fn find_by_issue(&self, issue_id: i32) -> AppResult<Vec<vote_connection::Model>> {
        VoteConnection::find()
            .filter(vote_connection::Column::IssueId.eq(issue_id))
            .order_by_asc(vote_connection::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether an issue has a connection to a vote in the given direction.
    pub async fn has_connection(
        &self,
        issue_id: i32,
        vote_id: i32,
        matches: bool,
    ) -> AppResult<bool> {
        let count = VoteConnection::find()
            .filter(vote_connection::Column::IssueId.eq(issue_id))
            .filter(vote_connection::Column::VoteId.eq(vote_id))
            .filter(vote_connection::Column::Matches.eq(matches))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new connection.
    pub async fn create(
        &self,
        model: vote_connection::ActiveModel,
    ) -> AppResult<vote_connection::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a connection.
    pub async fn update(
        &self,
        model: vote_connection::ActiveModel,
    ) -> AppResult<vote_connection::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a connection.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        VoteConnection::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
