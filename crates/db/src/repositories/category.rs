//! Category repository.

use std::sync::Arc;

use crate::entities::{category, Category};
use hdo_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

/// Category repository for database operations.
#[derive(Clone)]
pub struct CategoryRepository {
    db: Arc<DatabaseConnection>,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a category by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<category::Model>> {
        Category::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find category records by IDs.
    pub async fn find_by_ids(&self, ids: &[i32]) -> AppResult<Vec<category::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Category::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(category::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new category.
    pub async fn create(&self, name: &str) -> AppResult<category::Model> {
        category::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
