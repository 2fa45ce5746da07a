//! `SeaORM` Entity for transaction_types table.
//!
//! `participants` holds which sides are mandatory (OWNER, BENEFICIARY,
//! BOTH); `state` is ACTIVE or DEACTIVATE. A transaction type with a
//! `limit_type_id` is limit-checked at creation time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub tag: String,
    pub state: String,
    pub participants: String,
    pub limit_type_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::limit_types::Entity",
        from = "Column::LimitTypeId",
        to = "super::limit_types::Column::Id"
    )]
    LimitTypes,
}

impl Related<super::limit_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LimitTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
