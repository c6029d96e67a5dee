//! Issue promise join entity.

use sea_orm::entity::prelude::*;

/// Links an issue to a promise. Each pair appears at most once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "issue_promise")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub issue_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub promise_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id",
        on_delete = "Cascade"
    )]
    Issue,

    #[sea_orm(
        belongs_to = "super::promise::Entity",
        from = "Column::PromiseId",
        to = "super::promise::Column::Id",
        on_delete = "Cascade"
    )]
    Promise,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl Related<super::promise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
