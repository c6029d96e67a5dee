//! Party promise entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promise")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub body: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::issue_promise::Entity")]
    IssuePromise,
}

impl Related<super::issue_promise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IssuePromise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
