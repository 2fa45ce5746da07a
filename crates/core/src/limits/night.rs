//! Night window handling.
//!
//! A night window is a time-of-day interval, inclusive at both ends, that
//! may wrap past midnight (e.g. 22:00-06:00). While it is open, the nightly
//! thresholds and the nightly usage counter apply.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::operation::error::OperationError;

/// A configured night window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    /// Inclusive start time of day.
    pub start: NaiveTime,
    /// Inclusive end time of day; may be earlier than `start` (wraparound).
    pub end: NaiveTime,
}

impl NightWindow {
    /// Parses the persisted "HH:mm" pair.
    ///
    /// # Errors
    ///
    /// Returns an invalid-configuration error when either bound does not
    /// parse; the limit type tag is only known to the caller and is patched
    /// in there.
    pub fn parse(start: &str, end: &str) -> Result<Self, OperationError> {
        let parse_one = |raw: &str| {
            NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| {
                OperationError::InvalidLimitConfiguration {
                    limit_type: String::new(),
                    detail: format!("unparseable night window bound '{raw}'"),
                }
            })
        };
        Ok(Self {
            start: parse_one(start)?,
            end: parse_one(end)?,
        })
    }

    /// Returns true if the given time of day falls inside the window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            // Wraps past midnight: open from start until midnight and from
            // midnight until end.
            time >= self.start || time <= self.end
        }
    }

    /// Start of the night session that `now` belongs to.
    ///
    /// Only meaningful when `self.contains(now.time())`: for a wrapping
    /// window, a timestamp before the end bound belongs to the session that
    /// started yesterday.
    #[must_use]
    pub fn session_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today_start = now.date().and_time(self.start);
        if self.start > self.end && now.time() <= self.end {
            today_start - Duration::days(1)
        } else {
            today_start
        }
    }
}
