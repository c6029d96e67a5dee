//! Topic entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "topic")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue_topic::Entity")]
    IssueTopic,

    #[sea_orm(has_many = "super::vote_direction::Entity")]
    VoteDirection,
}

impl Related<super::issue_topic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssueTopic.def()
    }
}

impl Related<super::vote_direction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteDirection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
