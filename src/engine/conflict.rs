use chrono::NaiveDate;

use crate::model::Reservation;
use crate::time::{Instant, Window};

/// Reservations on `date` that still count: same calendar day and not yet
/// ended. Every guard filters through this before testing overlap.
fn live_on_date<'a>(
    reservations: &'a [Reservation],
    date: NaiveDate,
    now: Instant,
) -> impl Iterator<Item = &'a Reservation> {
    reservations
        .iter()
        .filter(move |r| r.date == date && r.is_upcoming(now))
}

/// Number of still-upcoming reservations on `date` whose window overlaps the
/// candidate. The admission rule compares this count against the resource's
/// capacity by equality: counts move by one per accepted admission under the
/// resource lock, so the count can never silently pass the capacity.
pub fn count_overlapping(
    reservations: &[Reservation],
    date: NaiveDate,
    window: &Window,
    now: Instant,
) -> usize {
    live_on_date(reservations, date, now)
        .filter(|r| r.window.overlaps(window))
        .count()
}

/// True iff any of the user's upcoming reservations — across all resources —
/// overlaps the candidate window on `date`.
pub fn user_has_conflict(
    user_reservations: &[Reservation],
    date: NaiveDate,
    window: &Window,
    now: Instant,
) -> bool {
    live_on_date(user_reservations, date, now).any(|r| r.window.overlaps(window))
}

/// The `collect_upcoming` filter: drop reservations whose end instant is at
/// or before `now`, preserving input order.
pub fn collect_upcoming(reservations: Vec<Reservation>, now: Instant) -> Vec<Reservation> {
    reservations
        .into_iter()
        .filter(|r| r.is_upcoming(now))
        .collect()
}
