//! `SeaORM` Entity for global_limits table.
//!
//! One compliance-wide configuration per limit type. The `user_*` columns
//! are per-user defaults applied when no user-specific override exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "global_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub limit_type_id: Uuid,
    pub nightly_limit: Option<Decimal>,
    pub daily_limit: Option<Decimal>,
    pub monthly_limit: Option<Decimal>,
    pub yearly_limit: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub min_amount: Option<Decimal>,
    pub max_amount_nightly: Option<Decimal>,
    pub min_amount_nightly: Option<Decimal>,
    pub user_nightly_limit: Option<Decimal>,
    pub user_daily_limit: Option<Decimal>,
    pub user_monthly_limit: Option<Decimal>,
    pub user_yearly_limit: Option<Decimal>,
    pub nighttime_start: Option<String>,
    pub nighttime_end: Option<String>,
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
