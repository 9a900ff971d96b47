//! Vehicle type entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    pub pool_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::space_pool::Entity",
        from = "Column::PoolId",
        to = "super::space_pool::Column::Id"
    )]
    SpacePool,
}

impl Related<super::space_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpacePool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
