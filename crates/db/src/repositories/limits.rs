//! Limit configuration and tracker persistence.
//!
//! Loads global and user limit rows into the domain configuration types
//! and manages the materialized usage trackers. A tracker created lazily
//! is seeded from the historical operation aggregate so the two usage
//! strategies agree at the handoff point; operations in REVERTED, DECLINED
//! or UNDONE state never contribute.

use chrono::{Datelike, Duration, NaiveDateTime};
use monetra_core::limits::{GlobalLimitConfig, NightWindow, PeriodStart, UsageCounters, UserLimitConfig};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::reference::LimitTypeInfo;
use super::RepositoryError;
use crate::entities::{global_limits, operations, transaction_types, user_limit_trackers, user_limits};

/// Operation states excluded from usage accumulation.
pub const EXCLUDED_STATES: [&str; 3] = ["REVERTED", "DECLINED", "UNDONE"];

/// Converts a global limit row into the domain configuration.
#[must_use]
pub fn global_config(model: &global_limits::Model) -> GlobalLimitConfig {
    GlobalLimitConfig {
        nightly_limit: model.nightly_limit,
        daily_limit: model.daily_limit,
        monthly_limit: model.monthly_limit,
        yearly_limit: model.yearly_limit,
        max_amount: model.max_amount,
        min_amount: model.min_amount,
        max_amount_nightly: model.max_amount_nightly,
        min_amount_nightly: model.min_amount_nightly,
        user_nightly_limit: model.user_nightly_limit,
        user_daily_limit: model.user_daily_limit,
        user_monthly_limit: model.user_monthly_limit,
        user_yearly_limit: model.user_yearly_limit,
        nighttime_start: model.nighttime_start.clone(),
        nighttime_end: model.nighttime_end.clone(),
    }
}

/// Converts a user limit row into the domain configuration.
#[must_use]
pub fn user_config(model: &user_limits::Model) -> UserLimitConfig {
    UserLimitConfig {
        nightly_limit: model.nightly_limit,
        daily_limit: model.daily_limit,
        monthly_limit: model.monthly_limit,
        yearly_limit: model.yearly_limit,
        max_amount: model.max_amount,
        min_amount: model.min_amount,
        max_amount_nightly: model.max_amount_nightly,
        min_amount_nightly: model.min_amount_nightly,
        user_nightly_limit: model.user_nightly_limit,
        user_daily_limit: model.user_daily_limit,
        user_monthly_limit: model.user_monthly_limit,
        user_yearly_limit: model.user_yearly_limit,
        user_max_amount: model.user_max_amount,
        user_min_amount: model.user_min_amount,
        user_max_amount_nightly: model.user_max_amount_nightly,
        user_min_amount_nightly: model.user_min_amount_nightly,
        nighttime_start: model.nighttime_start.clone(),
        nighttime_end: model.nighttime_end.clone(),
        credit_balance: model.credit_balance,
    }
}

/// Loads the compliance-wide limit for a limit type.
pub async fn load_global<C: ConnectionTrait>(
    conn: &C,
    limit_type_id: Uuid,
) -> Result<Option<GlobalLimitConfig>, RepositoryError> {
    let model = global_limits::Entity::find()
        .filter(global_limits::Column::LimitTypeId.eq(limit_type_id))
        .one(conn)
        .await?;
    Ok(model.as_ref().map(global_config))
}

/// Loads the user override for (user, limit type), with its row id.
pub async fn load_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    limit_type_id: Uuid,
) -> Result<Option<(Uuid, UserLimitConfig)>, RepositoryError> {
    let model = user_limits::Entity::find()
        .filter(user_limits::Column::UserId.eq(user_id))
        .filter(user_limits::Column::LimitTypeId.eq(limit_type_id))
        .one(conn)
        .await?;
    Ok(model.map(|m| (m.id, user_config(&m))))
}

/// Folds historical operation values into fresh usage counters.
///
/// Each item is (created at, value). An item contributes to a window when
/// it falls inside that window as measured at `now`: calendar containment
/// for `DATE` accounting, elapsed-time containment for `INTERVAL`. The
/// nightly counter only accumulates items from the currently open night
/// session.
#[must_use]
pub fn seed_counters(
    now: NaiveDateTime,
    mode: PeriodStart,
    night: Option<&NightWindow>,
    items: &[(NaiveDateTime, Decimal)],
) -> UsageCounters {
    let mut counters = UsageCounters::new(now);

    let session_open = night.is_some_and(|w| w.contains(now.time()));
    let session_start = night.map(|w| w.session_start(now));

    for &(created, value) in items {
        if created > now {
            continue;
        }

        let (in_daily, in_monthly, in_yearly) = match mode {
            PeriodStart::Date => (
                created.date() == now.date(),
                (created.year(), created.month()) == (now.year(), now.month()),
                created.year() == now.year(),
            ),
            PeriodStart::Interval => {
                let elapsed = now - created;
                (
                    elapsed < Duration::hours(24),
                    elapsed < Duration::days(30),
                    elapsed < Duration::days(365),
                )
            }
        };

        if in_daily {
            counters.used_daily += value;
        }
        if in_monthly {
            counters.used_monthly += value;
        }
        if in_yearly {
            counters.used_annual += value;
        }
        if session_open && session_start.is_some_and(|start| created >= start) {
            counters.used_nightly += value;
        }
    }

    counters
}

/// Signed consumption of one historical operation row for `user_id`.
///
/// A shared-currency record stores the owner-driven `value`; a user who
/// appears on it only as beneficiary consumed `raw_value - fee`, the
/// beneficiary-side signed value. Every other row already carries the
/// user's own side.
#[must_use]
pub fn usage_value(user_id: Uuid, op: &operations::Model) -> Decimal {
    if op.beneficiary_user_id == Some(user_id) && op.owner_user_id != Some(user_id) {
        op.raw_value - op.fee
    } else {
        op.value
    }
}

/// Sums the user's historical operations for a limit type.
///
/// Returns (created at, value) pairs for operations under any transaction
/// type governed by the limit type, where the user appears on either side,
/// excluding terminal-failure states. Values are signed for the side the
/// user occupies on each row.
pub async fn historical_usage<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    limit_type_id: Uuid,
    since: NaiveDateTime,
) -> Result<Vec<(NaiveDateTime, Decimal)>, RepositoryError> {
    let type_ids: Vec<Uuid> = transaction_types::Entity::find()
        .filter(transaction_types::Column::LimitTypeId.eq(limit_type_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if type_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = operations::Entity::find()
        .filter(operations::Column::TransactionTypeId.is_in(type_ids))
        .filter(
            Condition::any()
                .add(operations::Column::OwnerUserId.eq(user_id))
                .add(operations::Column::BeneficiaryUserId.eq(user_id)),
        )
        .filter(operations::Column::State.is_not_in(EXCLUDED_STATES))
        .filter(operations::Column::CreatedAt.gte(since.and_utc()))
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|op| (op.created_at.naive_utc(), usage_value(user_id, &op)))
        .collect())
}

fn counters_of(model: &user_limit_trackers::Model) -> UsageCounters {
    UsageCounters {
        used_daily: model.used_daily_limit,
        used_monthly: model.used_monthly_limit,
        used_annual: model.used_annual_limit,
        used_nightly: model.used_nightly_limit,
        period_start: model.period_start.naive_utc(),
        updated_at: model.updated_at.naive_utc(),
    }
}

/// Loads the tracker for (user, limit type) under a row lock, creating and
/// seeding it from the historical aggregate when absent.
pub async fn load_or_create_tracker<C: ConnectionTrait>(
    conn: &C,
    now: NaiveDateTime,
    user_id: Uuid,
    limit_type: &LimitTypeInfo,
    user_limit_id: Option<Uuid>,
    night: Option<&NightWindow>,
) -> Result<(Uuid, UsageCounters), RepositoryError> {
    let existing = user_limit_trackers::Entity::find()
        .filter(user_limit_trackers::Column::UserId.eq(user_id))
        .filter(user_limit_trackers::Column::LimitTypeId.eq(limit_type.id))
        .lock_exclusive()
        .one(conn)
        .await?;

    if let Some(model) = existing {
        return Ok((model.id, counters_of(&model)));
    }

    let history =
        historical_usage(conn, user_id, limit_type.id, now - Duration::days(365)).await?;
    let counters = seed_counters(now, limit_type.period_start, night, &history);

    let id = Uuid::new_v4();
    let model = user_limit_trackers::ActiveModel {
        id: Set(id),
        user_id: Set(user_id),
        limit_type_id: Set(limit_type.id),
        user_limit_id: Set(user_limit_id),
        used_daily_limit: Set(counters.used_daily),
        used_monthly_limit: Set(counters.used_monthly),
        used_annual_limit: Set(counters.used_annual),
        used_nightly_limit: Set(counters.used_nightly),
        period_start: Set(counters.period_start.and_utc().into()),
        updated_at: Set(counters.updated_at.and_utc().into()),
        created_at: Set(now.and_utc().into()),
    };
    model.insert(conn).await?;

    Ok((id, counters))
}

/// Persists updated counters on an existing tracker row.
pub async fn save_tracker<C: ConnectionTrait>(
    conn: &C,
    tracker_id: Uuid,
    counters: &UsageCounters,
) -> Result<(), RepositoryError> {
    let model = user_limit_trackers::ActiveModel {
        id: Set(tracker_id),
        used_daily_limit: Set(counters.used_daily),
        used_monthly_limit: Set(counters.used_monthly),
        used_annual_limit: Set(counters.used_annual),
        used_nightly_limit: Set(counters.used_nightly),
        period_start: Set(counters.period_start.and_utc().into()),
        updated_at: Set(counters.updated_at.and_utc().into()),
        ..Default::default()
    };
    model.update(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(chrono::NaiveTime::parse_from_str(time, "%H:%M").unwrap())
    }

    #[test]
    fn test_seed_date_mode_buckets_by_calendar() {
        let now = at(2026, 3, 15, "12:00");
        let items = [
            (at(2026, 3, 15, "09:00"), dec!(100)), // today
            (at(2026, 3, 1, "09:00"), dec!(200)),  // this month
            (at(2026, 1, 10, "09:00"), dec!(300)), // this year
            (at(2025, 12, 31, "09:00"), dec!(400)), // last year
        ];
        let counters = seed_counters(now, PeriodStart::Date, None, &items);
        assert_eq!(counters.used_daily, dec!(100));
        assert_eq!(counters.used_monthly, dec!(300));
        assert_eq!(counters.used_annual, dec!(600));
        assert_eq!(counters.used_nightly, dec!(0));
    }

    #[test]
    fn test_seed_interval_mode_buckets_by_elapsed_time() {
        let now = at(2026, 3, 15, "12:00");
        let items = [
            (now - Duration::hours(5), dec!(100)),
            (now - Duration::hours(30), dec!(200)),
            (now - Duration::days(40), dec!(300)),
            (now - Duration::days(400), dec!(400)),
        ];
        let counters = seed_counters(now, PeriodStart::Interval, None, &items);
        assert_eq!(counters.used_daily, dec!(100));
        assert_eq!(counters.used_monthly, dec!(300));
        assert_eq!(counters.used_annual, dec!(600));
    }

    #[test]
    fn test_seed_nightly_only_from_open_session() {
        let night = NightWindow::parse("22:00", "06:00").unwrap();
        let now = at(2026, 3, 16, "01:00");
        let items = [
            (at(2026, 3, 15, "23:00"), dec!(50)), // this session
            (at(2026, 3, 15, "12:00"), dec!(70)), // daytime
            (at(2026, 3, 14, "23:00"), dec!(90)), // previous session
        ];
        let counters = seed_counters(now, PeriodStart::Date, Some(&night), &items);
        assert_eq!(counters.used_nightly, dec!(50));
    }

    #[test]
    fn test_seed_nightly_zero_outside_window() {
        let night = NightWindow::parse("22:00", "06:00").unwrap();
        let now = at(2026, 3, 16, "14:00");
        let items = [(at(2026, 3, 16, "01:00"), dec!(50))];
        let counters = seed_counters(now, PeriodStart::Date, Some(&night), &items);
        assert_eq!(counters.used_nightly, dec!(0));
    }

    #[test]
    fn test_seed_ignores_future_items() {
        let now = at(2026, 3, 15, "12:00");
        let items = [(at(2026, 3, 15, "13:00"), dec!(100))];
        let counters = seed_counters(now, PeriodStart::Date, None, &items);
        assert_eq!(counters.used_daily, dec!(0));
    }

    fn operation_row(
        owner: Option<Uuid>,
        beneficiary: Option<Uuid>,
        raw: Decimal,
        fee: Decimal,
        value: Decimal,
    ) -> operations::Model {
        operations::Model {
            id: Uuid::new_v4(),
            transaction_type_id: Uuid::new_v4(),
            currency_id: Uuid::new_v4(),
            raw_value: raw,
            fee,
            value,
            state: "ACCEPTED".to_string(),
            description: "transfer".to_string(),
            owner_user_id: owner,
            owner_wallet_account_id: owner.map(|_| Uuid::new_v4()),
            beneficiary_user_id: beneficiary,
            beneficiary_wallet_account_id: beneficiary.map(|_| Uuid::new_v4()),
            operation_ref: None,
            owner_requested_raw_value: None,
            owner_requested_fee: None,
            user_limit_tracker_id: None,
            analysis_tags: serde_json::json!({}),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn test_usage_value_signs_by_occupied_side() {
        let owner = Uuid::new_v4();
        let beneficiary = Uuid::new_v4();

        // Shared-currency record stores the owner-driven value 102.
        let shared = operation_row(
            Some(owner),
            Some(beneficiary),
            dec!(100),
            dec!(2),
            dec!(102),
        );
        assert_eq!(usage_value(owner, &shared), dec!(102));
        assert_eq!(usage_value(beneficiary, &shared), dec!(98));

        // One-sided records already carry the user's own side.
        let credit = operation_row(None, Some(beneficiary), dec!(100), dec!(2), dec!(98));
        assert_eq!(usage_value(beneficiary, &credit), dec!(98));
        let debit = operation_row(Some(owner), None, dec!(100), dec!(2), dec!(102));
        assert_eq!(usage_value(owner, &debit), dec!(102));
    }

    #[test]
    fn test_config_conversions_carry_every_field() {
        let now = chrono::Utc::now().into();
        let model = user_limits::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            limit_type_id: Uuid::new_v4(),
            nightly_limit: Some(dec!(1)),
            daily_limit: Some(dec!(2)),
            monthly_limit: Some(dec!(3)),
            yearly_limit: Some(dec!(4)),
            max_amount: Some(dec!(5)),
            min_amount: Some(dec!(6)),
            max_amount_nightly: Some(dec!(7)),
            min_amount_nightly: Some(dec!(8)),
            user_nightly_limit: Some(dec!(9)),
            user_daily_limit: Some(dec!(10)),
            user_monthly_limit: Some(dec!(11)),
            user_yearly_limit: Some(dec!(12)),
            user_max_amount: Some(dec!(13)),
            user_min_amount: Some(dec!(14)),
            user_max_amount_nightly: Some(dec!(15)),
            user_min_amount_nightly: Some(dec!(16)),
            nighttime_start: Some("22:00".to_string()),
            nighttime_end: Some("06:00".to_string()),
            credit_balance: Some(dec!(17)),
            created_at: now,
            updated_at: now,
        };
        let config = user_config(&model);
        assert_eq!(config.user_daily_limit, Some(dec!(10)));
        assert_eq!(config.user_max_amount_nightly, Some(dec!(15)));
        assert_eq!(config.credit_balance, Some(dec!(17)));
        assert_eq!(config.nighttime_start.as_deref(), Some("22:00"));
    }
}
