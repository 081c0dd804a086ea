use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes since midnight — the only time-of-day type. Values past 1439 are
/// legal for window *ends*: a reservation starting at 23:00 for 2:00 ends at
/// minute 1500 and formats as "25:00". End times never wrap to the next day.
pub type Minutes = i32;

pub const MINUTES_PER_HOUR: Minutes = 60;

/// Unparsable date, time, or duration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTime(pub String);

impl std::fmt::Display for MalformedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed time: {}", self.0)
    }
}

impl std::error::Error for MalformedTime {}

/// Parse an "HH:MM" string into minutes since midnight. Both halves must be
/// integers; the minute half is not range-checked, matching the lenient
/// integer-pair contract for durations ("1:90" is 150 minutes).
pub fn parse_minutes(s: &str) -> Result<Minutes, MalformedTime> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| MalformedTime(s.to_string()))?;
    let hours: Minutes = h.trim().parse().map_err(|_| MalformedTime(s.to_string()))?;
    let mins: Minutes = m.trim().parse().map_err(|_| MalformedTime(s.to_string()))?;
    if hours < 0 || mins < 0 {
        return Err(MalformedTime(s.to_string()));
    }
    Ok(hours * MINUTES_PER_HOUR + mins)
}

/// Parse a "YYYY-MM-DD" calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate, MalformedTime> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| MalformedTime(s.to_string()))
}

/// Format minutes since midnight as "H:MM". The hour is not reduced modulo
/// 24, so past-midnight window ends render as "25:00" rather than wrapping.
pub fn format_minutes(m: Minutes) -> String {
    format!("{}:{:02}", m / MINUTES_PER_HOUR, m % MINUTES_PER_HOUR)
}

/// Half-open interval `[start, end)` in minutes of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: Minutes,
    pub end: Minutes,
}

impl Window {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        debug_assert!(start <= end, "Window start must not be after end");
        Self { start, end }
    }

    /// Build a window from a start and a duration. No clamping and no
    /// midnight wraparound: the end may exceed minute 1439.
    pub fn from_start_duration(start: Minutes, duration: Minutes) -> Self {
        Self::new(start, start + duration)
    }

    pub fn duration(&self) -> Minutes {
        self.end - self.start
    }

    /// The one overlap predicate — every guard in the engine folds over it.
    /// Two windows overlap iff they share a start, or the later start falls
    /// before the earlier end. Adjacent windows (`e1 == s2`) do not overlap.
    pub fn overlaps(&self, other: &Window) -> bool {
        self.start == other.start
            || self.start.max(other.start) < self.end.min(other.end)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", format_minutes(self.start), format_minutes(self.end))
    }
}

/// A minute-granularity point in time. Ordering is total: date, then minute.
/// The minute may exceed 1439 when derived from a past-midnight window end;
/// comparison stays within the instant's own date, as the windows do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Instant {
    pub date: NaiveDate,
    pub minute: Minutes,
}

impl Instant {
    pub fn new(date: NaiveDate, minute: Minutes) -> Self {
        Self { date, minute }
    }

    pub fn from_datetime(dt: chrono::NaiveDateTime) -> Self {
        Self {
            date: dt.date(),
            minute: (dt.hour() * 60 + dt.minute()) as Minutes,
        }
    }
}

impl std::fmt::Display for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, format_minutes(self.minute))
    }
}
