use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::time::{Instant, Minutes, Window};

/// An explicit set of tag strings with defined equality and containment.
/// Parsed from the comma-separated form owners type into the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split on commas, trim whitespace, drop empties, dedupe.
    pub fn parse(s: &str) -> Self {
        Self(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

/// A bookable resource: a room, a device, a slot on a shared machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Ulid,
    pub name: String,
    pub owner_id: String,
    /// Daily availability window start, minutes since midnight.
    pub open_minute: Minutes,
    /// Daily availability window end, minutes since midnight.
    pub close_minute: Minutes,
    /// Max reservations that may hold mutually overlapping windows (>= 1).
    pub capacity: u32,
    pub tags: TagSet,
    pub times_reserved: u64,
    pub last_reserved: Option<NaiveDateTime>,
    pub description: Option<String>,
    /// Opaque avatar bytes; the engine never interprets them.
    pub avatar: Option<Vec<u8>>,
}

impl Resource {
    /// The published daily availability window as a `Window`.
    pub fn availability_window(&self) -> Window {
        Window::new(self.open_minute, self.close_minute)
    }
}

/// Owner-supplied fields for creating or editing a resource. Times and tags
/// arrive as the strings the presentation layer collects; the engine parses
/// and validates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub owner_id: String,
    /// "HH:MM" daily open time.
    pub open: String,
    /// "HH:MM" daily close time.
    pub close: String,
    pub capacity: u32,
    /// Comma-separated tag list.
    pub tags: String,
    pub description: Option<String>,
    pub avatar: Option<Vec<u8>>,
}

/// An admitted reservation. Created only by the scheduler, read-only after,
/// removed by cancellation with no effect on the resource's counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub resource_id: Ulid,
    pub date: NaiveDate,
    /// `window.end == window.start + duration`, minute arithmetic, no
    /// midnight wraparound.
    pub window: Window,
    pub duration: Minutes,
    pub owner_id: String,
    /// Where the reservation-started notification goes.
    pub owner_contact: String,
    /// Denormalized so notifications need no catalog lookup.
    pub resource_name: String,
}

impl Reservation {
    pub fn start_instant(&self) -> Instant {
        Instant::new(self.date, self.window.start)
    }

    pub fn end_instant(&self) -> Instant {
        Instant::new(self.date, self.window.end)
    }

    /// A reservation stops counting against capacity once its end instant
    /// is at or before `now`.
    pub fn is_upcoming(&self, now: Instant) -> bool {
        self.end_instant() > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation(d: NaiveDate, start: Minutes, end: Minutes) -> Reservation {
        Reservation {
            id: Ulid::new(),
            resource_id: Ulid::new(),
            date: d,
            window: Window::new(start, end),
            duration: end - start,
            owner_id: "u1".into(),
            owner_contact: "u1@example.com".into(),
            resource_name: "Room A".into(),
        }
    }

    #[test]
    fn availability_window_spans_open_to_close() {
        let r = Resource {
            id: Ulid::new(),
            name: "Room A".into(),
            owner_id: "owner".into(),
            open_minute: 540,
            close_minute: 1020,
            capacity: 1,
            tags: TagSet::new(),
            times_reserved: 0,
            last_reserved: None,
            description: None,
            avatar: None,
        };
        assert_eq!(r.availability_window(), Window::new(540, 1020));
    }

    #[test]
    fn tagset_parse_trims_and_dedupes() {
        let tags = TagSet::parse(" projector, hdmi ,projector,,  ");
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("projector"));
        assert!(tags.contains("hdmi"));
        assert!(!tags.contains(" projector"));
    }

    #[test]
    fn tagset_equality_ignores_input_order() {
        assert_eq!(TagSet::parse("a,b,c"), TagSet::parse("c, a ,b"));
    }

    #[test]
    fn tagset_empty_input() {
        assert!(TagSet::parse("").is_empty());
        assert!(TagSet::parse(" , ,").is_empty());
    }

    #[test]
    fn upcoming_is_strict_on_end_instant() {
        let d = date(2024, 6, 10);
        let r = reservation(d, 600, 660);
        assert!(r.is_upcoming(Instant::new(d, 659)));
        assert!(!r.is_upcoming(Instant::new(d, 660))); // ended this minute
        assert!(!r.is_upcoming(Instant::new(d, 661)));
        assert!(!r.is_upcoming(Instant::new(date(2024, 6, 11), 0)));
    }

    #[test]
    fn past_midnight_end_still_upcoming_same_day() {
        let d = date(2024, 6, 10);
        let r = reservation(d, 1380, 1500); // 23:00 for 2:00
        assert!(r.is_upcoming(Instant::new(d, 1439)));
        assert!(r.is_upcoming(Instant::new(d, 1450)));
    }

    #[test]
    fn reservation_serde_roundtrip() {
        let r = reservation(date(2024, 6, 10), 600, 660);
        let json = serde_json::to_string(&r).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
