//! `SeaORM` Entity for user_limit_trackers table.
//!
//! Materialized usage counters per (user, limit type). Created lazily on
//! the first limit-checked operation; `user_limit_id` links back to the
//! user's override row when one exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_limit_trackers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub limit_type_id: Uuid,
    pub user_limit_id: Option<Uuid>,
    pub used_daily_limit: Decimal,
    pub used_monthly_limit: Decimal,
    pub used_annual_limit: Decimal,
    pub used_nightly_limit: Decimal,
    pub period_start: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_limits::Entity",
        from = "Column::UserLimitId",
        to = "super::user_limits::Column::Id"
    )]
    UserLimits,
    #[sea_orm(
        belongs_to = "super::limit_types::Entity",
        from = "Column::LimitTypeId",
        to = "super::limit_types::Column::Id"
    )]
    LimitTypes,
}

impl Related<super::user_limits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserLimits.def()
    }
}

impl Related<super::limit_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LimitTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
