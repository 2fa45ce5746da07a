//! `SeaORM` Entity for operations table.
//!
//! One ledger record per operation. The identifier is caller-supplied. A
//! same-currency two-sided operation is a single row with both roles
//! populated; a cross-currency pair is two rows cross-linked through
//! `operation_ref`. `owner_requested_raw_value`/`owner_requested_fee` are
//! populated only when available-value capping reduced the request.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_type_id: Uuid,
    pub currency_id: Uuid,
    pub raw_value: Decimal,
    pub fee: Decimal,
    pub value: Decimal,
    pub state: String,
    pub description: String,
    pub owner_user_id: Option<Uuid>,
    pub owner_wallet_account_id: Option<Uuid>,
    pub beneficiary_user_id: Option<Uuid>,
    pub beneficiary_wallet_account_id: Option<Uuid>,
    pub operation_ref: Option<Uuid>,
    pub owner_requested_raw_value: Option<Decimal>,
    pub owner_requested_fee: Option<Decimal>,
    pub user_limit_tracker_id: Option<Uuid>,
    pub analysis_tags: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_types::Entity",
        from = "Column::TransactionTypeId",
        to = "super::transaction_types::Column::Id"
    )]
    TransactionTypes,
    #[sea_orm(
        belongs_to = "super::currencies::Entity",
        from = "Column::CurrencyId",
        to = "super::currencies::Column::Id"
    )]
    Currencies,
}

impl Related<super::transaction_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTypes.def()
    }
}

impl Related<super::currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
