//! Parliamentary vote entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// What was voted over
    #[sea_orm(column_type = "Text")]
    pub subject: String,

    /// When the vote took place
    #[sea_orm(indexed)]
    pub time: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vote_connection::Entity")]
    VoteConnection,

    #[sea_orm(has_many = "super::vote_direction::Entity")]
    VoteDirection,
}

impl Related<super::vote_connection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteConnection.def()
    }
}

impl Related<super::vote_direction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VoteDirection.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
