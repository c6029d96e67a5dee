//! Vote repository.

use std::sync::Arc;

use crate::entities::{vote, Vote};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, Set,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<vote::Model>> {
        Vote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a new vote.
    pub async fn create(&self, subject: &str, time: DateTimeWithTimeZone) -> AppResult<vote::Model> {
        vote::ActiveModel {
            id: NotSet,
            subject: Set(subject.to_string()),
            time: Set(time),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
