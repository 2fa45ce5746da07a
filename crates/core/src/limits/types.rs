//! Limit policy types and effective-threshold resolution.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::night::NightWindow;
use crate::operation::error::OperationError;
use crate::operation::types::Side;

/// How a limit type accounts usage periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PeriodStart {
    /// Calendar-aligned: counters reset at midnight / first of month /
    /// first of year.
    Date,
    /// Rolling-window: counters reset once 24h / 30d / 365d have elapsed
    /// since the last qualifying operation.
    Interval,
}

impl PeriodStart {
    /// Parses the persisted string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DATE" => Some(Self::Date),
            "INTERVAL" => Some(Self::Interval),
            _ => None,
        }
    }
}

/// Which side(s) of an operation must pass limit enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LimitCheck {
    /// Only the owner side is checked.
    Owner,
    /// Only the beneficiary side is checked.
    Beneficiary,
    /// Both sides are checked, when present.
    Both,
}

impl LimitCheck {
    /// Parses the persisted string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "OWNER" => Some(Self::Owner),
            "BENEFICIARY" => Some(Self::Beneficiary),
            "BOTH" => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns true if the given side must be limit-checked.
    #[must_use]
    pub fn applies_to(self, side: Side) -> bool {
        match self {
            Self::Owner => side == Side::Owner,
            Self::Beneficiary => side == Side::Beneficiary,
            Self::Both => true,
        }
    }
}

/// Accumulation window of a usage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One calendar day or rolling 24 hours.
    Daily,
    /// One calendar month or rolling 30 days.
    Monthly,
    /// One calendar year or rolling 365 days.
    Yearly,
    /// The configured night window.
    Nightly,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
            Self::Nightly => write!(f, "nightly"),
        }
    }
}

/// Compliance-wide limit configuration for one limit type.
///
/// The `user_*_limit` fields are the per-user defaults applied when no
/// user-specific override exists; the bare fields are the compliance-wide
/// fallbacks.
#[derive(Debug, Clone, Default)]
pub struct GlobalLimitConfig {
    /// Nightly accumulation cap.
    pub nightly_limit: Option<Decimal>,
    /// Daily accumulation cap.
    pub daily_limit: Option<Decimal>,
    /// Monthly accumulation cap.
    pub monthly_limit: Option<Decimal>,
    /// Yearly accumulation cap.
    pub yearly_limit: Option<Decimal>,
    /// Maximum single-operation value.
    pub max_amount: Option<Decimal>,
    /// Minimum single-operation value.
    pub min_amount: Option<Decimal>,
    /// Maximum single-operation value inside the night window.
    pub max_amount_nightly: Option<Decimal>,
    /// Minimum single-operation value inside the night window.
    pub min_amount_nightly: Option<Decimal>,
    /// Per-user default nightly cap.
    pub user_nightly_limit: Option<Decimal>,
    /// Per-user default daily cap.
    pub user_daily_limit: Option<Decimal>,
    /// Per-user default monthly cap.
    pub user_monthly_limit: Option<Decimal>,
    /// Per-user default yearly cap.
    pub user_yearly_limit: Option<Decimal>,
    /// Night window start, "HH:mm".
    pub nighttime_start: Option<String>,
    /// Night window end, "HH:mm"; may wrap past midnight.
    pub nighttime_end: Option<String>,
}

/// Per-user limit configuration for one limit type.
///
/// Carries the same aggregate fields as [`GlobalLimitConfig`] plus
/// user-only overrides and the cross-currency credit allowance. A missing
/// user limit is valid; missing user *and* global limit is a configuration
/// error.
#[derive(Debug, Clone, Default)]
pub struct UserLimitConfig {
    /// Nightly accumulation cap.
    pub nightly_limit: Option<Decimal>,
    /// Daily accumulation cap.
    pub daily_limit: Option<Decimal>,
    /// Monthly accumulation cap.
    pub monthly_limit: Option<Decimal>,
    /// Yearly accumulation cap.
    pub yearly_limit: Option<Decimal>,
    /// Maximum single-operation value.
    pub max_amount: Option<Decimal>,
    /// Minimum single-operation value.
    pub min_amount: Option<Decimal>,
    /// Maximum single-operation value inside the night window.
    pub max_amount_nightly: Option<Decimal>,
    /// Minimum single-operation value inside the night window.
    pub min_amount_nightly: Option<Decimal>,
    /// User override for the nightly cap.
    pub user_nightly_limit: Option<Decimal>,
    /// User override for the daily cap.
    pub user_daily_limit: Option<Decimal>,
    /// User override for the monthly cap.
    pub user_monthly_limit: Option<Decimal>,
    /// User override for the yearly cap.
    pub user_yearly_limit: Option<Decimal>,
    /// User override for the maximum single-operation value.
    pub user_max_amount: Option<Decimal>,
    /// User override for the minimum single-operation value.
    pub user_min_amount: Option<Decimal>,
    /// User override for the nightly maximum.
    pub user_max_amount_nightly: Option<Decimal>,
    /// User override for the nightly minimum.
    pub user_min_amount_nightly: Option<Decimal>,
    /// Night window start, "HH:mm".
    pub nighttime_start: Option<String>,
    /// Night window end, "HH:mm".
    pub nighttime_end: Option<String>,
    /// Cross-currency credit allowance.
    pub credit_balance: Option<Decimal>,
}

/// The merged, applicable thresholds for one (user, limit type) pair.
#[derive(Debug, Clone, Default)]
pub struct EffectiveLimits {
    /// Effective maximum single-operation value.
    pub max_amount: Option<Decimal>,
    /// Effective minimum single-operation value.
    pub min_amount: Option<Decimal>,
    /// Effective nightly maximum.
    pub max_amount_nightly: Option<Decimal>,
    /// Effective nightly minimum.
    pub min_amount_nightly: Option<Decimal>,
    /// Effective daily accumulation cap.
    pub daily_cap: Option<Decimal>,
    /// Effective monthly accumulation cap.
    pub monthly_cap: Option<Decimal>,
    /// Effective yearly accumulation cap.
    pub yearly_cap: Option<Decimal>,
    /// Effective nightly accumulation cap.
    pub nightly_cap: Option<Decimal>,
    /// Parsed night window, when configured.
    pub night_window: Option<NightWindow>,
    /// Credit allowance; zero when none is configured.
    pub credit_balance: Decimal,
}

fn chain(options: [Option<Decimal>; 4]) -> Option<Decimal> {
    options.into_iter().flatten().next()
}

impl EffectiveLimits {
    /// Merges user and global configuration into effective thresholds.
    ///
    /// A user override wins over the user-level default, which wins over
    /// the compliance-wide value. Accumulation caps fall back through
    /// `user.user_x` → `user.x` → `global.user_x` → `global.x`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when neither configuration exists or
    /// the night window does not parse.
    pub fn resolve(
        limit_type: &str,
        user: Option<&UserLimitConfig>,
        global: Option<&GlobalLimitConfig>,
    ) -> Result<Self, OperationError> {
        if user.is_none() && global.is_none() {
            return Err(OperationError::LimitConfigurationMissing(
                limit_type.to_string(),
            ));
        }

        let u = |f: fn(&UserLimitConfig) -> Option<Decimal>| user.and_then(f);
        let g = |f: fn(&GlobalLimitConfig) -> Option<Decimal>| global.and_then(f);

        let night_pair = user
            .and_then(|c| Some((c.nighttime_start.clone()?, c.nighttime_end.clone()?)))
            .or_else(|| {
                global.and_then(|c| Some((c.nighttime_start.clone()?, c.nighttime_end.clone()?)))
            });
        let night_window = night_pair
            .map(|(start, end)| {
                NightWindow::parse(&start, &end).map_err(|err| match err {
                    OperationError::InvalidLimitConfiguration { detail, .. } => {
                        OperationError::InvalidLimitConfiguration {
                            limit_type: limit_type.to_string(),
                            detail,
                        }
                    }
                    other => other,
                })
            })
            .transpose()?;

        Ok(Self {
            max_amount: chain([
                u(|c| c.user_max_amount),
                u(|c| c.max_amount),
                g(|c| c.max_amount),
                None,
            ]),
            min_amount: chain([
                u(|c| c.user_min_amount),
                u(|c| c.min_amount),
                g(|c| c.min_amount),
                None,
            ]),
            max_amount_nightly: chain([
                u(|c| c.user_max_amount_nightly),
                u(|c| c.max_amount_nightly),
                g(|c| c.max_amount_nightly),
                None,
            ]),
            min_amount_nightly: chain([
                u(|c| c.user_min_amount_nightly),
                u(|c| c.min_amount_nightly),
                g(|c| c.min_amount_nightly),
                None,
            ]),
            daily_cap: chain([
                u(|c| c.user_daily_limit),
                u(|c| c.daily_limit),
                g(|c| c.user_daily_limit),
                g(|c| c.daily_limit),
            ]),
            monthly_cap: chain([
                u(|c| c.user_monthly_limit),
                u(|c| c.monthly_limit),
                g(|c| c.user_monthly_limit),
                g(|c| c.monthly_limit),
            ]),
            yearly_cap: chain([
                u(|c| c.user_yearly_limit),
                u(|c| c.yearly_limit),
                g(|c| c.user_yearly_limit),
                g(|c| c.yearly_limit),
            ]),
            nightly_cap: chain([
                u(|c| c.user_nightly_limit),
                u(|c| c.nightly_limit),
                g(|c| c.user_nightly_limit),
                g(|c| c.nightly_limit),
            ]),
            night_window,
            credit_balance: user.and_then(|c| c.credit_balance).unwrap_or(Decimal::ZERO),
        })
    }

    /// Returns true if `now` falls inside the configured night window.
    #[must_use]
    pub fn night_active(&self, now: NaiveDateTime) -> bool {
        self.night_window
            .as_ref()
            .is_some_and(|w| w.contains(now.time()))
    }

    /// Static threshold checks for a single operation value.
    ///
    /// Checked in order: max, min, then the nightly pair when the night
    /// window is open. Each violation is a standalone failure.
    pub fn check_thresholds(
        &self,
        value: Decimal,
        in_night: bool,
    ) -> Result<(), OperationError> {
        if let Some(max) = self.max_amount {
            if value > max {
                return Err(OperationError::AboveMaxAmount { value, max });
            }
        }
        if let Some(min) = self.min_amount {
            if value < min {
                return Err(OperationError::BelowMinAmount { value, min });
            }
        }
        if in_night {
            if let Some(max) = self.max_amount_nightly {
                if value > max {
                    return Err(OperationError::AboveMaxAmountNightly { value, max });
                }
            }
            if let Some(min) = self.min_amount_nightly {
                if value < min {
                    return Err(OperationError::BelowMinAmountNightly { value, min });
                }
            }
        }
        Ok(())
    }

    /// Effective accumulation cap for one granularity.
    #[must_use]
    pub fn cap_for(&self, granularity: Granularity) -> Option<Decimal> {
        match granularity {
            Granularity::Daily => self.daily_cap,
            Granularity::Monthly => self.monthly_cap,
            Granularity::Yearly => self.yearly_cap,
            Granularity::Nightly => self.nightly_cap,
        }
    }
}
