//! Test utilities for database operations.
//!
//! Provides an in-memory SQLite database whose schema is generated from the
//! entity definitions, so multi-step flows can be tested without a running
//! `PostgreSQL` server.

use std::sync::Arc;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use tracing::info;

use crate::entities::{
    Category, Issue, IssueCategory, IssuePromise, IssueTopic, Promise, Topic, User, Vote,
    VoteConnection, VoteDirection,
};

/// A test database context backed by in-memory SQLite.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database with every table created.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        // Every pooled connection would otherwise see its own empty database.
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        create_schema(&conn).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }

    /// Get a shared handle suitable for constructing repositories.
    #[must_use]
    pub fn shared(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Remove all rows from every table, children first.
    pub async fn cleanup(&self) -> Result<(), DbErr> {
        let db = self.connection();
        VoteConnection::delete_many().exec(db).await?;
        VoteDirection::delete_many().exec(db).await?;
        IssueTopic::delete_many().exec(db).await?;
        IssueCategory::delete_many().exec(db).await?;
        IssuePromise::delete_many().exec(db).await?;
        Issue::delete_many().exec(db).await?;
        Vote::delete_many().exec(db).await?;
        Topic::delete_many().exec(db).await?;
        Category::delete_many().exec(db).await?;
        Promise::delete_many().exec(db).await?;
        User::delete_many().exec(db).await?;

        info!("Cleaned up test database");
        Ok(())
    }
}

/// Create all tables from the entity definitions, parents first.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Vote),
        schema.create_table_from_entity(Topic),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Promise),
        schema.create_table_from_entity(Issue),
        schema.create_table_from_entity(IssueTopic),
        schema.create_table_from_entity(IssueCategory),
        schema.create_table_from_entity(IssuePromise),
        schema.create_table_from_entity(VoteConnection),
        schema.create_table_from_entity(VoteDirection),
    ];

    for statement in &statements {
        db.execute(backend.build(statement)).await?;
    }

    Ok(())
}
