//! User repository.

use std::sync::Arc;

use crate::entities::{user, User};
use chrono::Utc;
use hdo_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, Set};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i32) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {id}")))
    }

    /// Create a new user.
    pub async fn create(&self, name: &str) -> AppResult<user::Model> {
        user::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}
