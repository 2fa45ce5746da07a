//! `SeaORM` Entity for pending_wallet_account_transactions table.
//!
//! Provisional holds against a wallet account that are not yet reflected
//! in its balance, keyed by the operation that produced them. Consumed by
//! credit-balance liability valuation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_wallet_account_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub operation_id: Uuid,
    pub wallet_account_id: Uuid,
    pub value: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallet_accounts::Entity",
        from = "Column::WalletAccountId",
        to = "super::wallet_accounts::Column::Id"
    )]
    WalletAccounts,
}

impl Related<super::wallet_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
