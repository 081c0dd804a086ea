use chrono::{NaiveDateTime, TimeDelta, Utc};

use crate::time::Instant;

/// The deployment's effective time source: wall clock shifted back by a
/// configured number of hours. Originally the shift was hard-coded; here it
/// is injected once at startup and every "has this passed?" decision routes
/// through the same instance. Tests pin time with [`Clock::fixed`].
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset_hours: i64,
    fixed: Option<NaiveDateTime>,
}

/// Hour offset the original deployment ran with.
pub const DEFAULT_OFFSET_HOURS: i64 = 4;

impl Clock {
    pub fn system(offset_hours: i64) -> Self {
        Self {
            offset_hours,
            fixed: None,
        }
    }

    /// A clock frozen at the given instant. For tests.
    pub fn fixed(now: NaiveDateTime) -> Self {
        Self {
            offset_hours: 0,
            fixed: Some(now),
        }
    }

    /// Current adjusted time at full resolution.
    pub fn now_datetime(&self) -> NaiveDateTime {
        match self.fixed {
            Some(dt) => dt,
            None => Utc::now().naive_utc() - TimeDelta::hours(self.offset_hours),
        }
    }

    /// Current adjusted time at minute granularity — the resolution every
    /// admission and reminder decision is made at.
    pub fn now(&self) -> Instant {
        Instant::from_datetime(self.now_datetime())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system(DEFAULT_OFFSET_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn fixed_clock_returns_given_instant() {
        let dt = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(10, 30, 12)
            .unwrap();
        let clock = Clock::fixed(dt);
        assert_eq!(clock.now_datetime(), dt);
        assert_eq!(clock.now().minute, 630);
    }

    #[test]
    fn default_clock_runs_at_the_deployment_offset() {
        let clock = Clock::default();
        assert_eq!(clock.offset_hours, DEFAULT_OFFSET_HOURS);
        assert!(clock.fixed.is_none());
    }

    #[test]
    fn system_clock_applies_offset() {
        let unshifted = Clock::system(0).now_datetime();
        let shifted = Clock::system(4).now_datetime();
        let delta = unshifted - shifted;
        // Allow slack for the two Utc::now() calls.
        assert!(delta >= TimeDelta::hours(4) - TimeDelta::seconds(5));
        assert!(delta <= TimeDelta::hours(4) + TimeDelta::seconds(5));
    }
}
