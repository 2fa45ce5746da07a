//! Usage counter arithmetic for limit trackers.
//!
//! A tracker materializes the allowance a user has consumed per window.
//! Before an operation is checked against the caps, every counter whose
//! period has elapsed since the tracker was last touched is restarted; on
//! success the counters are incremented and stamped.

use chrono::{Datelike, Duration, NaiveDateTime};
use rust_decimal::Decimal;

use super::night::NightWindow;
use super::types::{EffectiveLimits, Granularity, PeriodStart};
use crate::operation::error::OperationError;

/// Consumed allowance per accumulation window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageCounters {
    /// Usage within the daily window.
    pub used_daily: Decimal,
    /// Usage within the monthly window.
    pub used_monthly: Decimal,
    /// Usage within the yearly window.
    pub used_annual: Decimal,
    /// Usage within the current night session.
    pub used_nightly: Decimal,
    /// When the tracked period began.
    pub period_start: NaiveDateTime,
    /// Last time an operation consumed allowance.
    pub updated_at: NaiveDateTime,
}

impl UsageCounters {
    /// A fresh, zeroed tracker starting now.
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            used_daily: Decimal::ZERO,
            used_monthly: Decimal::ZERO,
            used_annual: Decimal::ZERO,
            used_nightly: Decimal::ZERO,
            period_start: now,
            updated_at: now,
        }
    }

    /// Restarts every counter whose period has elapsed since `updated_at`.
    ///
    /// `Date` accounting resets on calendar boundaries; `Interval`
    /// accounting resets once the rolling window has fully elapsed. The
    /// nightly counter resets whenever `now` is outside the night window,
    /// or when the tracker was last touched before the current night
    /// session opened.
    #[must_use]
    pub fn rolled_over(
        &self,
        now: NaiveDateTime,
        mode: PeriodStart,
        night: Option<&NightWindow>,
    ) -> Self {
        let (reset_daily, reset_monthly, reset_yearly) = match mode {
            PeriodStart::Date => {
                let last = self.updated_at.date();
                let today = now.date();
                (
                    last != today,
                    (last.year(), last.month()) != (today.year(), today.month()),
                    last.year() != today.year(),
                )
            }
            PeriodStart::Interval => {
                // Rolling windows: 24 hours, 30 days, 365 days.
                let elapsed = now - self.updated_at;
                (
                    elapsed >= Duration::hours(24),
                    elapsed >= Duration::days(30),
                    elapsed >= Duration::days(365),
                )
            }
        };

        let reset_nightly = match night {
            None => true,
            Some(window) => {
                !window.contains(now.time()) || self.updated_at < window.session_start(now)
            }
        };

        let zero_if = |reset: bool, value: Decimal| if reset { Decimal::ZERO } else { value };

        Self {
            used_daily: zero_if(reset_daily, self.used_daily),
            used_monthly: zero_if(reset_monthly, self.used_monthly),
            used_annual: zero_if(reset_yearly, self.used_annual),
            used_nightly: zero_if(reset_nightly, self.used_nightly),
            period_start: if reset_daily && reset_monthly && reset_yearly {
                now
            } else {
                self.period_start
            },
            updated_at: self.updated_at,
        }
    }

    /// Usage accumulated in one window.
    #[must_use]
    pub fn used(&self, granularity: Granularity) -> Decimal {
        match granularity {
            Granularity::Daily => self.used_daily,
            Granularity::Monthly => self.used_monthly,
            Granularity::Yearly => self.used_annual,
            Granularity::Nightly => self.used_nightly,
        }
    }

    /// Checks `used + value` against every configured cap.
    ///
    /// The nightly cap only applies while the night window is open.
    ///
    /// # Errors
    ///
    /// Returns an available-limit-exceeded error naming the exhausted
    /// granularity.
    pub fn check(
        &self,
        value: Decimal,
        limits: &EffectiveLimits,
        in_night: bool,
    ) -> Result<(), OperationError> {
        let granularities = [
            Granularity::Daily,
            Granularity::Monthly,
            Granularity::Yearly,
            Granularity::Nightly,
        ];
        for granularity in granularities {
            if granularity == Granularity::Nightly && !in_night {
                continue;
            }
            if let Some(cap) = limits.cap_for(granularity) {
                let used = self.used(granularity);
                if used + value > cap {
                    return Err(OperationError::AvailableLimitExceeded {
                        granularity,
                        used,
                        value,
                        cap,
                    });
                }
            }
        }
        Ok(())
    }

    /// Consumes allowance and stamps the tracker.
    pub fn apply(&mut self, value: Decimal, now: NaiveDateTime, in_night: bool) {
        self.used_daily += value;
        self.used_monthly += value;
        self.used_annual += value;
        if in_night {
            self.used_nightly += value;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(chrono::NaiveTime::parse_from_str(time, "%H:%M").unwrap())
    }

    fn tracker_with_usage(updated_at: NaiveDateTime) -> UsageCounters {
        UsageCounters {
            used_daily: dec!(100),
            used_monthly: dec!(200),
            used_annual: dec!(300),
            used_nightly: dec!(40),
            period_start: updated_at,
            updated_at,
        }
    }

    fn night() -> NightWindow {
        NightWindow::parse("22:00", "06:00").unwrap()
    }

    #[test]
    fn test_same_day_keeps_counters() {
        let t = tracker_with_usage(at(2026, 3, 10, "09:00"));
        let rolled = t.rolled_over(at(2026, 3, 10, "15:00"), PeriodStart::Date, None);
        assert_eq!(rolled.used_daily, dec!(100));
        assert_eq!(rolled.used_monthly, dec!(200));
        assert_eq!(rolled.used_annual, dec!(300));
    }

    #[test]
    fn test_calendar_day_rollover_resets_daily_only() {
        let t = tracker_with_usage(at(2026, 3, 10, "23:00"));
        let rolled = t.rolled_over(at(2026, 3, 11, "00:05"), PeriodStart::Date, None);
        assert_eq!(rolled.used_daily, dec!(0));
        assert_eq!(rolled.used_monthly, dec!(200));
        assert_eq!(rolled.used_annual, dec!(300));
    }

    #[test]
    fn test_calendar_month_rollover_resets_daily_and_monthly() {
        let t = tracker_with_usage(at(2026, 1, 31, "12:00"));
        let rolled = t.rolled_over(at(2026, 2, 1, "12:00"), PeriodStart::Date, None);
        assert_eq!(rolled.used_daily, dec!(0));
        assert_eq!(rolled.used_monthly, dec!(0));
        assert_eq!(rolled.used_annual, dec!(300));
    }

    #[test]
    fn test_calendar_year_rollover_resets_everything() {
        let t = tracker_with_usage(at(2025, 12, 31, "23:59"));
        let rolled = t.rolled_over(at(2026, 1, 1, "00:01"), PeriodStart::Date, None);
        assert_eq!(rolled.used_daily, dec!(0));
        assert_eq!(rolled.used_monthly, dec!(0));
        assert_eq!(rolled.used_annual, dec!(0));
        assert_eq!(rolled.period_start, at(2026, 1, 1, "00:01"));
    }

    #[rstest]
    #[case("23:00", false)] // 23h elapsed: window still open
    #[case("25:00", true)] // over 24h: restart
    fn test_interval_daily_window(#[case] elapsed: &str, #[case] restarted: bool) {
        let start = at(2026, 3, 10, "00:00");
        let parts: Vec<u32> = elapsed.split(':').map(|p| p.parse().unwrap()).collect();
        let now = start + Duration::hours(i64::from(parts[0])) + Duration::minutes(i64::from(parts[1]));
        let t = tracker_with_usage(start);
        let rolled = t.rolled_over(now, PeriodStart::Interval, None);
        assert_eq!(rolled.used_daily == dec!(0), restarted);
        // A new calendar day alone never restarts an interval tracker.
        assert_eq!(rolled.used_monthly, dec!(200));
    }

    #[test]
    fn test_interval_monthly_and_yearly_windows() {
        let start = at(2025, 1, 1, "00:00");
        let t = tracker_with_usage(start);

        let rolled = t.rolled_over(start + Duration::days(31), PeriodStart::Interval, None);
        assert_eq!(rolled.used_daily, dec!(0));
        assert_eq!(rolled.used_monthly, dec!(0));
        assert_eq!(rolled.used_annual, dec!(300));

        let rolled = t.rolled_over(start + Duration::days(366), PeriodStart::Interval, None);
        assert_eq!(rolled.used_annual, dec!(0));
    }

    #[test]
    fn test_nightly_keeps_within_same_session() {
        let t = tracker_with_usage(at(2026, 3, 10, "22:30"));
        let rolled = t.rolled_over(at(2026, 3, 11, "02:00"), PeriodStart::Date, Some(&night()));
        assert_eq!(rolled.used_nightly, dec!(40));
    }

    #[test]
    fn test_nightly_resets_outside_window() {
        let t = tracker_with_usage(at(2026, 3, 10, "23:00"));
        let rolled = t.rolled_over(at(2026, 3, 11, "10:00"), PeriodStart::Date, Some(&night()));
        assert_eq!(rolled.used_nightly, dec!(0));
    }

    #[test]
    fn test_nightly_resets_on_next_night_session() {
        // Last touched during the night of the 10th; probed during the
        // night of the 11th. Consecutive nights never share a counter.
        let t = tracker_with_usage(at(2026, 3, 10, "23:00"));
        let rolled = t.rolled_over(at(2026, 3, 11, "23:00"), PeriodStart::Date, Some(&night()));
        assert_eq!(rolled.used_nightly, dec!(0));
    }

    #[test]
    fn test_no_night_window_zeroes_nightly() {
        let t = tracker_with_usage(at(2026, 3, 10, "23:00"));
        let rolled = t.rolled_over(at(2026, 3, 10, "23:30"), PeriodStart::Date, None);
        assert_eq!(rolled.used_nightly, dec!(0));
    }

    #[test]
    fn test_check_daily_cap_exhaustion() {
        let limits = EffectiveLimits {
            daily_cap: Some(dec!(1500)),
            ..EffectiveLimits::default()
        };
        let mut t = UsageCounters::new(at(2026, 3, 10, "09:00"));
        t.apply(dec!(1010), at(2026, 3, 10, "09:00"), false);

        let err = t.check(dec!(1010), &limits, false).unwrap_err();
        match err {
            OperationError::AvailableLimitExceeded {
                granularity,
                used,
                cap,
                ..
            } => {
                assert_eq!(granularity, Granularity::Daily);
                assert_eq!(used, dec!(1010));
                assert_eq!(cap, dec!(1500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_exact_cap_is_allowed() {
        let limits = EffectiveLimits {
            daily_cap: Some(dec!(1500)),
            ..EffectiveLimits::default()
        };
        let t = UsageCounters::new(at(2026, 3, 10, "09:00"));
        assert!(t.check(dec!(1500), &limits, false).is_ok());
    }

    #[test]
    fn test_nightly_cap_ignored_outside_window() {
        let limits = EffectiveLimits {
            nightly_cap: Some(dec!(100)),
            ..EffectiveLimits::default()
        };
        let t = UsageCounters::new(at(2026, 3, 10, "12:00"));
        assert!(t.check(dec!(500), &limits, false).is_ok());
        assert!(matches!(
            t.check(dec!(500), &limits, true),
            Err(OperationError::AvailableLimitExceeded {
                granularity: Granularity::Nightly,
                ..
            })
        ));
    }

    #[test]
    fn test_apply_increments_and_stamps() {
        let start = at(2026, 3, 10, "09:00");
        let later = at(2026, 3, 10, "23:30");
        let mut t = UsageCounters::new(start);

        t.apply(dec!(100), start, false);
        assert_eq!(t.used_daily, dec!(100));
        assert_eq!(t.used_nightly, dec!(0));

        t.apply(dec!(50), later, true);
        assert_eq!(t.used_daily, dec!(150));
        assert_eq!(t.used_monthly, dec!(150));
        assert_eq!(t.used_annual, dec!(150));
        assert_eq!(t.used_nightly, dec!(50));
        assert_eq!(t.updated_at, later);
    }
}
