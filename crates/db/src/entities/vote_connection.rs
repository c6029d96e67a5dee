//! Vote connection entity: whether a vote supports or opposes an issue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_connection")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub vote_id: i32,

    #[sea_orm(indexed)]
    pub issue_id: i32,

    /// `true` when the vote supports the issue, `false` when it opposes it
    pub matches: bool,

    /// Extra fields passed through from the editor (JSON object)
    #[sea_orm(column_type = "Json")]
    pub data: JsonValue,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vote::Entity",
        from = "Column::VoteId",
        to = "super::vote::Column::Id",
        on_delete = "Cascade"
    )]
    Vote,

    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id",
        on_delete = "Cascade"
    )]
    Issue,
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
