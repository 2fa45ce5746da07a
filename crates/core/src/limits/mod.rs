//! Layered spending-limit policy.
//!
//! Two independent regimes are reconciled here: compliance-defined global
//! limits and user-defined overrides, with calendar-aligned or
//! rolling-window usage accounting and a configurable night window under
//! which stricter thresholds apply.

pub mod night;
pub mod tracker;
pub mod types;

pub use night::NightWindow;
pub use tracker::UsageCounters;
pub use types::{
    EffectiveLimits, GlobalLimitConfig, Granularity, LimitCheck, PeriodStart, UserLimitConfig,
};
