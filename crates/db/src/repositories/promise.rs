//! Promise repository.

use std::sync::Arc;

use crate::entities::{promise, Promise};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

/// Promise repository for database operations.
#[derive(Clone)]
pub struct PromiseRepository {
    db: Arc<DatabaseConnection>,
}

impl PromiseRepository {
    /// Create a new promise repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a promise by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<promise::Model>> {
        Promise::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find promise records by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<promise::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Promise::find()
            .filter(promise::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(promise::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new promise.
    pub async fn create(&self, body: &str) -> AppResult<promise::Model> {
        promise::ActiveModel {
            id: NotSet,
            body: Set(body.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
