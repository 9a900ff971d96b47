//! Reservation entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub code: String,

    pub full_name: String,
    pub email: String,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    pub vehicle_type_id: i32,
    pub vehicle_plate: String,

    #[sea_orm(nullable)]
    pub vehicle_model: Option<String>,

    /// online | on_site
    pub payment_method: String,

    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,

    /// pending | active | finished | canceled | payment_failed
    pub status: String,

    /// none | pending | succeeded | refunded | voided | failed
    pub payment_status: String,

    #[sea_orm(nullable)]
    pub provider_reference: Option<String>,

    #[sea_orm(nullable)]
    pub payment_intent: Option<String>,

    #[sea_orm(nullable)]
    pub total_price_cents: Option<i64>,

    pub locale: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle_type::Entity",
        from = "Column::VehicleTypeId",
        to = "super::vehicle_type::Column::Id"
    )]
    VehicleType,
}

impl Related<super::vehicle_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
