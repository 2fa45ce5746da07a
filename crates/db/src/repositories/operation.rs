//! Operation repository: the transactional create path.
//!
//! One invocation runs inside exactly one database transaction spanning
//! every read and write. Wallet-account and tracker rows are read under
//! row locks so concurrent invocations for the same account or user
//! serialize through the database, never through an in-process mutex.
//! Events are emitted only after the transaction commits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use monetra_core::credit::{check_credit_balance, liability, CurrencyPosition};
use monetra_core::events::{OperationEvents, PendingOperationEvent, UserLimitEvent};
use monetra_core::limits::{EffectiveLimits, UserLimitConfig};
use monetra_core::operation::resolve::{
    self, CurrencyInfo, WalletAccountInfo, WalletInfo,
};
use monetra_core::operation::{
    cap_to_balance, CapOutcome, CreateOperationDraft, OperationShape, ParticipantDraft,
    ParticipantInput, Side,
};
use monetra_core::quotes::QuotationSource;
use monetra_core::OperationError;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use super::reference::{self, LimitTypeInfo};
use super::{limits, RepositoryError};
use crate::entities::{
    currencies, operations, pending_wallet_account_transactions, user_limit_trackers,
    wallet_accounts, wallets,
};

/// The state every operation is created in.
const STATE_PENDING: &str = "PENDING";

/// The committed result of one create invocation.
#[derive(Debug, Clone)]
pub struct CreatedOperation {
    /// The primary record (the only record for all shapes but the
    /// cross-currency pair, where it is the owner-side record).
    pub primary: operations::Model,
    /// The beneficiary-side record of a cross-currency pair.
    pub secondary: Option<operations::Model>,
}

/// One fully resolved side of the operation being created.
struct ResolvedSide {
    side: Side,
    input: ParticipantInput,
    currency: CurrencyInfo,
    wallet: WalletInfo,
    account: WalletAccountInfo,
    /// (requested raw value, requested fee), set when capping reduced the
    /// request.
    requested: Option<(Decimal, Decimal)>,
    tracker_id: Option<Uuid>,
    limit_event: Option<UserLimitEvent>,
}

impl ResolvedSide {
    fn value(&self) -> Decimal {
        self.side.signed_value(self.input.raw_value, self.input.fee)
    }
}

/// Repository owning operation creation and its narrow read surface.
#[derive(Clone)]
pub struct OperationRepository {
    db: DatabaseConnection,
    quotations: Arc<dyn QuotationSource>,
    events: Arc<dyn OperationEvents>,
}

impl OperationRepository {
    /// Creates a new operation repository.
    pub fn new(
        db: DatabaseConnection,
        quotations: Arc<dyn QuotationSource>,
        events: Arc<dyn OperationEvents>,
    ) -> Self {
        Self {
            db,
            quotations,
            events,
        }
    }

    /// Creates one operation (or a linked cross-currency pair) atomically.
    ///
    /// Resolution, capping, limit enforcement, the funds check and every
    /// write happen inside a single database transaction; either all of it
    /// commits or nothing is written. Notifications are emitted once per
    /// created record after the commit.
    ///
    /// # Errors
    ///
    /// Any domain rejection or database failure aborts the transaction
    /// with nothing written.
    pub async fn create_operation(
        &self,
        draft: CreateOperationDraft,
    ) -> Result<CreatedOperation, RepositoryError> {
        let tag = draft
            .transaction_type_tag
            .as_deref()
            .ok_or(OperationError::MissingTransactionTypeTag)?;

        let now = Utc::now();
        let naive_now = now.naive_utc();

        let txn = self.db.begin().await?;

        let transaction_type = reference::find_transaction_type(&txn, tag).await?;
        resolve::validate_transaction_type(&transaction_type)?;
        resolve::validate_required_sides(
            transaction_type.participants,
            draft.owner.as_ref(),
            draft.beneficiary.as_ref(),
        )?;

        let mut owner = match draft.owner.as_ref() {
            Some(side_draft) => Some(resolve_side(&txn, Side::Owner, side_draft).await?),
            None => None,
        };
        let mut beneficiary = match draft.beneficiary.as_ref() {
            Some(side_draft) => Some(resolve_side(&txn, Side::Beneficiary, side_draft).await?),
            None => None,
        };

        // Available-value capping, owner side only.
        if let Some(side) = owner.as_mut() {
            if side.input.allow_available_raw_value {
                if let CapOutcome::Capped {
                    raw_value,
                    fee,
                    requested_raw_value,
                    requested_fee,
                } = cap_to_balance(side.input.raw_value, side.input.fee, side.account.balance)
                {
                    tracing::debug!(
                        operation_id = %side.input.operation_id,
                        requested = %requested_raw_value,
                        capped = %raw_value,
                        "capped owner request to available balance"
                    );
                    side.input.raw_value = raw_value;
                    side.input.fee = fee;
                    side.requested = Some((requested_raw_value, requested_fee));
                }
            }
        }

        // Limit enforcement for every side the limit type covers.
        let mut limit_type: Option<LimitTypeInfo> = None;
        let mut owner_limits: Option<EffectiveLimits> = None;
        if let Some(limit_type_id) = transaction_type.limit_type_id {
            let lt = reference::find_limit_type(&txn, limit_type_id).await?;
            if let Some(side) = owner.as_mut() {
                if lt.check.applies_to(Side::Owner) {
                    owner_limits = Some(enforce_limits(&txn, &lt, side, naive_now).await?);
                }
            }
            if let Some(side) = beneficiary.as_mut() {
                if lt.check.applies_to(Side::Beneficiary) {
                    enforce_limits(&txn, &lt, side, naive_now).await?;
                }
            }
            limit_type = Some(lt);
        }

        // Funds check for the owner-side debit, with the credit-balance
        // accommodation when the balance falls short. The allowance comes
        // from the owner's user limit even when the limit type only
        // checks the beneficiary side.
        if let Some(side) = owner.as_ref() {
            let value = side.value();
            if side.account.balance < value {
                let fallback = match (owner_limits.as_ref(), limit_type.as_ref()) {
                    (None, Some(lt)) => limits::load_user(&txn, side.wallet.user_id, lt.id)
                        .await?
                        .map(|(_, config)| config),
                    _ => None,
                };
                let credit_balance = credit_allowance(owner_limits.as_ref(), fallback.as_ref());
                let Some(lt) = limit_type
                    .as_ref()
                    .filter(|_| credit_balance > Decimal::ZERO)
                else {
                    return Err(OperationError::InsufficientFunds {
                        required: value,
                        available: side.account.balance,
                    }
                    .into());
                };
                self.check_credit_line(&txn, side, beneficiary.as_ref(), lt, credit_balance, now)
                    .await?;
            }
        }

        let shape = OperationShape::of(
            owner.as_ref().map(|s| &s.input),
            beneficiary.as_ref().map(|s| &s.input),
        );
        let limit_tag = limit_type.as_ref().map(|lt| lt.tag.as_str());

        let (primary, secondary) = match (owner.as_ref(), beneficiary.as_ref()) {
            (Some(side), None) => {
                let model =
                    build_record(side, Some(side), None, None, transaction_type.id, limit_tag, now)
                        .insert(&txn)
                        .await?;
                (model, None)
            }
            (None, Some(side)) => {
                let model =
                    build_record(side, None, Some(side), None, transaction_type.id, limit_tag, now)
                        .insert(&txn)
                        .await?;
                (model, None)
            }
            (Some(owner_side), Some(beneficiary_side))
                if shape == OperationShape::SharedSameCurrency =>
            {
                // One record under the owner-supplied identifier; a
                // differing beneficiary identifier is discarded.
                let model = build_record(
                    owner_side,
                    Some(owner_side),
                    Some(beneficiary_side),
                    None,
                    transaction_type.id,
                    limit_tag,
                    now,
                )
                .insert(&txn)
                .await?;
                (model, None)
            }
            (Some(owner_side), Some(beneficiary_side)) => {
                let owner_model = build_record(
                    owner_side,
                    Some(owner_side),
                    None,
                    Some(beneficiary_side.input.operation_id),
                    transaction_type.id,
                    limit_tag,
                    now,
                )
                .insert(&txn)
                .await?;
                let beneficiary_model = build_record(
                    beneficiary_side,
                    None,
                    Some(beneficiary_side),
                    Some(owner_side.input.operation_id),
                    transaction_type.id,
                    limit_tag,
                    now,
                )
                .insert(&txn)
                .await?;
                (owner_model, Some(beneficiary_model))
            }
            (None, None) => {
                return Err(OperationError::MissingParticipant(Side::Owner).into());
            }
        };

        // Owner debit: funds move from available to held.
        if let Some(side) = owner.as_ref() {
            let (balance, pending_amount) = debit_to_held(&side.account, side.value());
            let update = wallet_accounts::ActiveModel {
                id: Set(side.account.id),
                balance: Set(balance),
                pending_amount: Set(pending_amount),
                updated_at: Set(now.into()),
                ..Default::default()
            };
            update.update(&txn).await?;
        }

        txn.commit().await?;

        tracing::info!(
            operation_id = %primary.id,
            transaction_type = %transaction_type.tag,
            shape = ?shape,
            "operation created"
        );

        for event in pending_events(
            &primary,
            secondary.as_ref(),
            owner.as_ref(),
            beneficiary.as_ref(),
            &transaction_type.tag,
        ) {
            self.events.pending_operation_created(&event).await;
        }
        for side in [owner.as_ref(), beneficiary.as_ref()].into_iter().flatten() {
            if let Some(event) = side.limit_event.as_ref() {
                self.events.user_limit_consumed(event).await;
            }
        }

        Ok(CreatedOperation { primary, secondary })
    }

    /// Validates the owner's cross-currency credit line against their full
    /// liability, creating the provisional holds for the operation first.
    async fn check_credit_line(
        &self,
        txn: &impl ConnectionTrait,
        owner: &ResolvedSide,
        beneficiary: Option<&ResolvedSide>,
        limit_type: &LimitTypeInfo,
        credit_balance: Decimal,
        now: chrono::DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        // Both holds are recorded before the decision so the liability
        // computation sees the operation being created.
        let owner_hold = pending_wallet_account_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            operation_id: Set(owner.input.operation_id),
            wallet_account_id: Set(owner.account.id),
            value: Set(-owner.value()),
            created_at: Set(now.into()),
        };
        owner_hold.insert(txn).await?;
        if let Some(side) = beneficiary {
            let hold = pending_wallet_account_transactions::ActiveModel {
                id: Set(Uuid::new_v4()),
                operation_id: Set(side.input.operation_id),
                wallet_account_id: Set(side.account.id),
                value: Set(side.value()),
                created_at: Set(now.into()),
            };
            hold.insert(txn).await?;
        }

        let home = reference::currency_symbol(txn, limit_type.currency_id).await?;
        let positions = user_positions(txn, owner.wallet.user_id).await?;

        let mut rates: HashMap<String, Decimal> = HashMap::new();
        for position in &positions {
            if position.currency != home && !rates.contains_key(&position.currency) {
                if let Some(rate) = self.quotations.rate(&position.currency, &home).await {
                    rates.insert(position.currency.clone(), rate);
                }
            }
        }

        let total = liability(&home, &positions, |from, to| {
            if to == home {
                rates.get(from).copied()
            } else {
                None
            }
        })?;
        check_credit_balance(total, credit_balance)?;

        tracing::info!(
            user_id = %owner.wallet.user_id,
            liability = %total,
            credit_balance = %credit_balance,
            "owner debit accommodated by credit line"
        );
        Ok(())
    }

    /// Fetches an operation by identifier.
    pub async fn find_operation(
        &self,
        id: Uuid,
    ) -> Result<Option<operations::Model>, RepositoryError> {
        Ok(operations::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Fetches the wallet account for (wallet, currency symbol).
    pub async fn find_wallet_account(
        &self,
        wallet_id: Uuid,
        currency_symbol: &str,
    ) -> Result<Option<wallet_accounts::Model>, RepositoryError> {
        let Some(currency) = currencies::Entity::find()
            .filter(currencies::Column::Symbol.eq(currency_symbol))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        Ok(wallet_accounts::Entity::find()
            .filter(wallet_accounts::Column::WalletId.eq(wallet_id))
            .filter(wallet_accounts::Column::CurrencyId.eq(currency.id))
            .one(&self.db)
            .await?)
    }

    /// Fetches the tracker row for (user, limit type).
    pub async fn find_tracker(
        &self,
        user_id: Uuid,
        limit_type_id: Uuid,
    ) -> Result<Option<user_limit_trackers::Model>, RepositoryError> {
        Ok(user_limit_trackers::Entity::find()
            .filter(user_limit_trackers::Column::UserId.eq(user_id))
            .filter(user_limit_trackers::Column::LimitTypeId.eq(limit_type_id))
            .one(&self.db)
            .await?)
    }

    /// Sums the user's historical usage for a limit type since `since`,
    /// excluding REVERTED, DECLINED and UNDONE operations.
    pub async fn used_amount(
        &self,
        user_id: Uuid,
        limit_type_id: Uuid,
        since: NaiveDateTime,
    ) -> Result<Decimal, RepositoryError> {
        let items = limits::historical_usage(&self.db, user_id, limit_type_id, since).await?;
        Ok(items.into_iter().map(|(_, value)| value).sum())
    }

    /// Lists provisional holds against a wallet account.
    pub async fn list_pending_transactions(
        &self,
        wallet_account_id: Uuid,
    ) -> Result<Vec<pending_wallet_account_transactions::Model>, RepositoryError> {
        Ok(pending_wallet_account_transactions::Entity::find()
            .filter(
                pending_wallet_account_transactions::Column::WalletAccountId.eq(wallet_account_id),
            )
            .all(&self.db)
            .await?)
    }
}

/// Resolves and validates one supplied side against master data, locking
/// its wallet-account row.
async fn resolve_side<C: ConnectionTrait>(
    conn: &C,
    side: Side,
    draft: &ParticipantDraft,
) -> Result<ResolvedSide, RepositoryError> {
    let input = resolve::validate_participant(side, draft)?;

    let currency = reference::find_currency(conn, &input.currency).await?;
    resolve::ensure_currency_active(&currency)?;

    let wallet = reference::find_wallet(conn, input.wallet_id).await?;
    resolve::ensure_wallet_active(&wallet)?;

    let account_model = reference::find_wallet_account_locked(conn, wallet.id, &currency).await?;
    let account = reference::account_info(&account_model)?;
    resolve::ensure_wallet_account_active(&account)?;

    Ok(ResolvedSide {
        side,
        input,
        currency,
        wallet,
        account,
        requested: None,
        tracker_id: None,
        limit_event: None,
    })
}

/// Runs the full limit regime for one side: effective-threshold checks,
/// tracker rollover, accumulation checks, and the usage increment.
async fn enforce_limits<C: ConnectionTrait>(
    conn: &C,
    limit_type: &LimitTypeInfo,
    side: &mut ResolvedSide,
    now: NaiveDateTime,
) -> Result<EffectiveLimits, RepositoryError> {
    let user_id = side.wallet.user_id;
    let user_row = limits::load_user(conn, user_id, limit_type.id).await?;
    let global = limits::load_global(conn, limit_type.id).await?;

    let effective = EffectiveLimits::resolve(
        &limit_type.tag,
        user_row.as_ref().map(|(_, config)| config),
        global.as_ref(),
    )?;

    let value = side.value();
    let in_night = effective.night_active(now);
    effective.check_thresholds(value, in_night)?;

    let (tracker_id, counters) = limits::load_or_create_tracker(
        conn,
        now,
        user_id,
        limit_type,
        user_row.map(|(id, _)| id),
        effective.night_window.as_ref(),
    )
    .await?;

    let mut counters =
        counters.rolled_over(now, limit_type.period_start, effective.night_window.as_ref());
    counters.check(value, &effective, in_night)?;
    counters.apply(value, now, in_night);
    limits::save_tracker(conn, tracker_id, &counters).await?;

    side.tracker_id = Some(tracker_id);
    side.limit_event = Some(UserLimitEvent {
        user_id,
        limit_type: limit_type.tag.clone(),
        consumed: value,
        used_daily: counters.used_daily,
    });

    Ok(effective)
}

/// Collects the user's wallet-account positions for liability valuation,
/// including the provisional holds not yet posted to balance.
async fn user_positions<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<CurrencyPosition>, RepositoryError> {
    let wallet_ids: Vec<Uuid> = wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|w| w.id)
        .collect();
    if wallet_ids.is_empty() {
        return Ok(Vec::new());
    }

    let accounts = wallet_accounts::Entity::find()
        .filter(wallet_accounts::Column::WalletId.is_in(wallet_ids))
        .all(conn)
        .await?;

    let currency_ids: Vec<Uuid> = accounts.iter().map(|a| a.currency_id).collect();
    let symbols: HashMap<Uuid, String> = currencies::Entity::find()
        .filter(currencies::Column::Id.is_in(currency_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.symbol))
        .collect();

    let account_ids: Vec<Uuid> = accounts.iter().map(|a| a.id).collect();
    let mut holds: HashMap<Uuid, Decimal> = HashMap::new();
    for hold in pending_wallet_account_transactions::Entity::find()
        .filter(pending_wallet_account_transactions::Column::WalletAccountId.is_in(account_ids))
        .all(conn)
        .await?
    {
        *holds.entry(hold.wallet_account_id).or_default() += hold.value;
    }

    let mut positions = Vec::with_capacity(accounts.len());
    for account in accounts {
        let Some(symbol) = symbols.get(&account.currency_id) else {
            return Err(OperationError::CurrencyNotFound(account.currency_id.to_string()).into());
        };
        positions.push(CurrencyPosition {
            currency: symbol.clone(),
            balance: account.balance,
            pending: holds.get(&account.id).copied().unwrap_or(Decimal::ZERO),
        });
    }
    Ok(positions)
}

/// The owner's cross-currency credit allowance.
///
/// Prefers the already-resolved effective limits when enforcement ran for
/// the owner side; otherwise reads the allowance straight off the user
/// limit row. Zero when neither carries one.
fn credit_allowance(
    enforced: Option<&EffectiveLimits>,
    fallback: Option<&UserLimitConfig>,
) -> Decimal {
    match enforced {
        Some(limits) => limits.credit_balance,
        None => fallback
            .and_then(|config| config.credit_balance)
            .unwrap_or(Decimal::ZERO),
    }
}

/// Builds one "pending operation created" payload per committed record.
///
/// The primary record announces under the currency of whichever side
/// drove it (owner when present); the secondary record of a
/// cross-currency pair announces under the beneficiary's currency.
fn pending_events(
    primary: &operations::Model,
    secondary: Option<&operations::Model>,
    owner: Option<&ResolvedSide>,
    beneficiary: Option<&ResolvedSide>,
    transaction_type: &str,
) -> Vec<PendingOperationEvent> {
    let pairs = [
        (Some(primary), owner.or(beneficiary)),
        (secondary, beneficiary),
    ];
    pairs
        .into_iter()
        .filter_map(|(model, side)| {
            let (model, side) = (model?, side?);
            Some(PendingOperationEvent {
                operation_id: model.id,
                transaction_type: transaction_type.to_string(),
                currency: side.currency.symbol.clone(),
                value: model.value,
            })
        })
        .collect()
}

/// Moves an owner debit from available balance to held funds.
///
/// Returns the updated (balance, pending amount) pair. The debited value
/// stays on the account as a hold until later acceptance settles it.
fn debit_to_held(account: &WalletAccountInfo, value: Decimal) -> (Decimal, Decimal) {
    (account.balance - value, account.pending_amount + value)
}

/// Builds one operation row. `driver` supplies currency, amounts and
/// description; `owner`/`beneficiary` fill the role columns they cover.
fn build_record(
    driver: &ResolvedSide,
    owner: Option<&ResolvedSide>,
    beneficiary: Option<&ResolvedSide>,
    operation_ref: Option<Uuid>,
    transaction_type_id: Uuid,
    limit_tag: Option<&str>,
    now: chrono::DateTime<Utc>,
) -> operations::ActiveModel {
    let requested = owner.and_then(|s| s.requested);
    let tracker_id = owner
        .and_then(|s| s.tracker_id)
        .or_else(|| beneficiary.and_then(|s| s.tracker_id));

    operations::ActiveModel {
        id: Set(driver.input.operation_id),
        transaction_type_id: Set(transaction_type_id),
        currency_id: Set(driver.currency.id),
        raw_value: Set(driver.input.raw_value),
        fee: Set(driver.input.fee),
        value: Set(driver.value()),
        state: Set(STATE_PENDING.to_string()),
        description: Set(driver.input.description.clone()),
        owner_user_id: Set(owner.map(|s| s.wallet.user_id)),
        owner_wallet_account_id: Set(owner.map(|s| s.account.id)),
        beneficiary_user_id: Set(beneficiary.map(|s| s.wallet.user_id)),
        beneficiary_wallet_account_id: Set(beneficiary.map(|s| s.account.id)),
        operation_ref: Set(operation_ref),
        owner_requested_raw_value: Set(requested.map(|(raw, _)| raw)),
        owner_requested_fee: Set(requested.map(|(_, fee)| fee)),
        user_limit_tracker_id: Set(tracker_id),
        analysis_tags: Set(json!({
            "limitType": limit_tag,
            "capped": requested.is_some(),
        })),
        created_at: Set(now.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn resolved(side: Side, currency: &str, raw: Decimal, fee: Decimal) -> ResolvedSide {
        ResolvedSide {
            side,
            input: ParticipantInput {
                operation_id: Uuid::new_v4(),
                wallet_id: Uuid::new_v4(),
                currency: currency.to_string(),
                raw_value: raw,
                fee,
                description: "transfer".to_string(),
                allow_available_raw_value: false,
            },
            currency: CurrencyInfo {
                id: Uuid::new_v4(),
                symbol: currency.to_string(),
                decimal_places: 2,
                is_active: true,
            },
            wallet: WalletInfo {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                is_active: true,
            },
            account: WalletAccountInfo {
                id: Uuid::new_v4(),
                balance: dec!(1000),
                pending_amount: dec!(0),
                is_active: true,
            },
            requested: None,
            tracker_id: None,
            limit_event: None,
        }
    }

    fn committed(side: &ResolvedSide) -> operations::Model {
        operations::Model {
            id: side.input.operation_id,
            transaction_type_id: Uuid::new_v4(),
            currency_id: side.currency.id,
            raw_value: side.input.raw_value,
            fee: side.input.fee,
            value: side.value(),
            state: "PENDING".to_string(),
            description: side.input.description.clone(),
            owner_user_id: None,
            owner_wallet_account_id: None,
            beneficiary_user_id: None,
            beneficiary_wallet_account_id: None,
            operation_ref: None,
            owner_requested_raw_value: None,
            owner_requested_fee: None,
            user_limit_tracker_id: None,
            analysis_tags: json!({}),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_credit_allowance_falls_back_to_user_limit_row() {
        let enforced = EffectiveLimits {
            credit_balance: dec!(250),
            ..EffectiveLimits::default()
        };
        let config = UserLimitConfig {
            credit_balance: Some(dec!(400)),
            ..UserLimitConfig::default()
        };

        // Enforcement ran for the owner side: its resolved allowance wins.
        assert_eq!(credit_allowance(Some(&enforced), None), dec!(250));
        // Beneficiary-only limit check: the user limit row still supplies
        // the allowance.
        assert_eq!(credit_allowance(None, Some(&config)), dec!(400));
        assert_eq!(credit_allowance(None, None), dec!(0));
    }

    #[test]
    fn test_one_event_per_committed_record() {
        let owner = resolved(Side::Owner, "BRL", dec!(100), dec!(2));
        let beneficiary = resolved(Side::Beneficiary, "USD", dec!(100), dec!(2));
        let primary = committed(&owner);
        let secondary = committed(&beneficiary);

        // Cross-currency pair: two records, two events, each under its
        // own side's currency.
        let events = pending_events(
            &primary,
            Some(&secondary),
            Some(&owner),
            Some(&beneficiary),
            "EXCHANGE",
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].operation_id, primary.id);
        assert_eq!(events[0].currency, "BRL");
        assert_eq!(events[0].value, dec!(102));
        assert_eq!(events[1].operation_id, secondary.id);
        assert_eq!(events[1].currency, "USD");
        assert_eq!(events[1].value, dec!(98));

        // Single record cases announce exactly once.
        let events = pending_events(&primary, None, Some(&owner), Some(&beneficiary), "TRANSFER");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].currency, "BRL");

        let credit = committed(&beneficiary);
        let events = pending_events(&credit, None, None, Some(&beneficiary), "CASH_IN");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].currency, "USD");
    }

    #[test]
    fn test_debit_moves_value_from_balance_to_held() {
        let account = WalletAccountInfo {
            id: Uuid::new_v4(),
            balance: dec!(100000),
            pending_amount: dec!(10000),
            is_active: true,
        };
        let (balance, pending) = debit_to_held(&account, dec!(1000));
        assert_eq!(balance, dec!(99000));
        assert_eq!(pending, dec!(11000));
        // The account total is conserved; only the split changes.
        assert_eq!(balance + pending, account.balance + account.pending_amount);
    }

    #[test]
    fn test_debit_under_credit_accommodation_goes_negative() {
        let account = WalletAccountInfo {
            id: Uuid::new_v4(),
            balance: dec!(50),
            pending_amount: dec!(0),
            is_active: true,
        };
        let (balance, pending) = debit_to_held(&account, dec!(120));
        assert_eq!(balance, dec!(-70));
        assert_eq!(pending, dec!(120));
    }

    #[test]
    fn test_side_values_follow_fee_direction() {
        let owner = resolved(Side::Owner, "BRL", dec!(100), dec!(2));
        assert_eq!(owner.value(), dec!(102));
        let beneficiary = resolved(Side::Beneficiary, "BRL", dec!(100), dec!(2));
        assert_eq!(beneficiary.value(), dec!(98));
    }

    #[test]
    fn test_build_record_owner_only() {
        let side = resolved(Side::Owner, "BRL", dec!(1000), dec!(0));
        let tt = Uuid::new_v4();
        let model = build_record(&side, Some(&side), None, None, tt, Some("CASH_OUT"), Utc::now());
        assert_eq!(model.id.clone().unwrap(), side.input.operation_id);
        assert_eq!(model.value.clone().unwrap(), dec!(1000));
        assert_eq!(model.state.clone().unwrap(), "PENDING");
        assert_eq!(
            model.owner_wallet_account_id.clone().unwrap(),
            Some(side.account.id)
        );
        assert_eq!(model.beneficiary_user_id.clone().unwrap(), None);
        assert_eq!(
            model.analysis_tags.clone().unwrap()["limitType"],
            "CASH_OUT"
        );
    }

    #[test]
    fn test_build_record_preserves_capped_request() {
        let mut side = resolved(Side::Owner, "BRL", dec!(75), dec!(5));
        side.requested = Some((dec!(100), dec!(5)));
        let tt = Uuid::new_v4();
        let model = build_record(&side, Some(&side), None, None, tt, None, Utc::now());
        assert_eq!(
            model.owner_requested_raw_value.clone().unwrap(),
            Some(dec!(100))
        );
        assert_eq!(model.owner_requested_fee.clone().unwrap(), Some(dec!(5)));
        assert_eq!(model.analysis_tags.clone().unwrap()["capped"], true);
    }

    #[test]
    fn test_build_record_cross_links_pair() {
        let owner = resolved(Side::Owner, "BRL", dec!(100), dec!(2));
        let beneficiary = resolved(Side::Beneficiary, "USD", dec!(100), dec!(2));
        let tt = Uuid::new_v4();

        let owner_model = build_record(
            &owner,
            Some(&owner),
            None,
            Some(beneficiary.input.operation_id),
            tt,
            None,
            Utc::now(),
        );
        let beneficiary_model = build_record(
            &beneficiary,
            None,
            Some(&beneficiary),
            Some(owner.input.operation_id),
            tt,
            None,
            Utc::now(),
        );

        assert_eq!(
            owner_model.operation_ref.clone().unwrap(),
            Some(beneficiary.input.operation_id)
        );
        assert_eq!(
            beneficiary_model.operation_ref.clone().unwrap(),
            Some(owner.input.operation_id)
        );
        assert_eq!(owner_model.value.clone().unwrap(), dec!(102));
        assert_eq!(beneficiary_model.value.clone().unwrap(), dec!(98));
    }
}
