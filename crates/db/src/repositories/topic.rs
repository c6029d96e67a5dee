//! Topic repository.

use std::sync::Arc;

use crate::entities::{topic, Topic};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

/// Topic repository for database operations.
#[derive(Clone)]
pub struct TopicRepository {
    db: Arc<DatabaseConnection>,
}

impl TopicRepository {
    /// Create a new topic repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a topic by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<topic::Model>> {
        Topic::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find topic records by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<topic::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Topic::find()
            .filter(topic::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(topic::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new topic.
    pub async fn create(&self, name: &str) -> AppResult<topic::Model> {
        topic::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
