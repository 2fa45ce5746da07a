//! `SeaORM` Entity for user_limits table.
//!
//! Per (user, limit type) overrides. Carries the same aggregate columns as
//! global_limits plus user-only threshold overrides and the cross-currency
//! credit allowance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "user_limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
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
    pub user_max_amount: Option<Decimal>,
    pub user_min_amount: Option<Decimal>,
    pub user_max_amount_nightly: Option<Decimal>,
    pub user_min_amount_nightly: Option<Decimal>,
    pub nighttime_start: Option<String>,
    pub nighttime_end: Option<String>,
    pub credit_balance: Option<Decimal>,
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
    #[sea_orm(has_many = "super::user_limit_trackers::Entity")]
    UserLimitTrackers,
}

impl Related<super::limit_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LimitTypes.def()
    }
}

impl Related<super::user_limit_trackers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserLimitTrackers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
