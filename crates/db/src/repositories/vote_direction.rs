//! Vote direction repository.

use std::sync::Arc;

use crate::entities::{vote_direction, VoteDirection};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Vote direction repository for database operations.
#[derive(Clone)]
pub struct VoteDirectionRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteDirectionRepository {
    /// Create a new vote direction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the direction recorded for a vote on a topic.
    pub async fn find_by_topic_and_vote(
        &self,
        topic_id: i32,
        vote_id: i32,
    ) -> AppResult<Option<vote_direction::Model>> {
        VoteDirection::find()
            .filter(vote_direction::Column::TopicId.eq(topic_id))
            .filter(vote_direction::Column::VoteId.eq(vote_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All directions recorded for a topic.
    pub async fn find_by_topic(&self, topic_id: i32) -> AppResult<Vec<vote_direction::Model>> {
        VoteDirection::find()
            .filter(vote_direction::Column::TopicId.eq(topic_id))
            .order_by_asc(vote_direction::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new direction.
    pub async fn create(
        &self,
        model: vote_direction::ActiveModel,
    ) -> AppResult<vote_direction::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a direction.
    pub async fn update(
        &self,
        model: vote_direction::ActiveModel,
    ) -> AppResult<vote_direction::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a direction.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        VoteDirection::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
