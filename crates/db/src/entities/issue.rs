//! Issue entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "issue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Unique, non-blank title
    #[sea_orm(unique)]
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub published: bool,

    /// URL slug derived from the title
    #[sea_orm(unique)]
    pub slug: String,

    /// User who last changed the issue or its vote connections
    #[sea_orm(nullable, indexed)]
    pub last_updated_by_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LastUpdatedById",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    LastUpdatedBy,

    #[sea_orm(has_many = "super::vote_connection::Entity")]
    VoteConnection,

    #[sea_orm(has_many = "super::issue_topic::Entity")]
    IssueTopic,

    #[sea_orm(has_many = "super::issue_category::Entity")]
    IssueCategory,

    #[sea_orm(has_many = "super::issue_promise::Entity")]
    IssuePromise,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LastUpdatedBy.def()
    }
}

impl Related<super::vote_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteConnection.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        super::vote_connection::Relation::Vote.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::vote_connection::Relation::Issue.def().rev())
    }
}

impl Related<super::topic::Entity> for Entity {
    fn to() -> RelationDef {
        super::issue_topic::Relation::Topic.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::issue_topic::Relation::Issue.def().rev())
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::issue_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::issue_category::Relation::Issue.def().rev())
    }
}

impl Related<super::promise::Entity> for Entity {
    fn to() -> RelationDef {
        super::issue_promise::Relation::Promise.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::issue_promise::Relation::Issue.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
