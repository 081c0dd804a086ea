use serde::{Deserialize, Serialize};

use crate::model::Resource;
use crate::observability;
use crate::time::{Window, parse_date, parse_minutes};

use super::conflict::count_overlapping;
use super::{Engine, EngineError};

/// A candidate slot as collected from the caller: "when could I book
/// something for this long?"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub start: String,
    /// "HH:MM"
    pub duration: String,
}

/// A candidate window fits a resource iff it lies fully inside the published
/// daily availability window. Numeric minute comparison on both bounds —
/// never on the raw time strings.
pub fn fits_window(resource: &Resource, window: &Window) -> bool {
    let available = resource.availability_window();
    window.start >= available.start && window.end <= available.end
}

impl Engine {
    /// Filter the catalog to resources that could host the candidate window:
    /// open at that time of day and under capacity for it. Catalog order
    /// (most recently reserved first) is preserved. Read-only — results may
    /// be stale relative to in-flight admissions by the time the caller
    /// submits, which is acceptable.
    pub async fn search_availability(
        &self,
        query: AvailabilityQuery,
    ) -> Result<Vec<Resource>, EngineError> {
        let date = parse_date(&query.date)?;
        let start = parse_minutes(&query.start)?;
        let duration = parse_minutes(&query.duration)?;
        let window = Window::from_start_duration(start, duration);
        let now = self.clock.now();

        let mut available = Vec::new();
        for resource in self.store.list_all_resources().await? {
            if !fits_window(&resource, &window) {
                continue;
            }
            let existing = self.store.list_reservations_by_resource(resource.id).await?;
            if count_overlapping(&existing, date, &window, now) == resource.capacity as usize {
                continue;
            }
            available.push(resource);
        }

        metrics::counter!(observability::SEARCHES_TOTAL).increment(1);
        tracing::debug!(%date, %window, hits = available.len(), "availability search");
        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagSet;
    use ulid::Ulid;

    fn resource(open: i32, close: i32) -> Resource {
        Resource {
            id: Ulid::new(),
            name: "Room A".into(),
            owner_id: "owner".into(),
            open_minute: open,
            close_minute: close,
            capacity: 1,
            tags: TagSet::new(),
            times_reserved: 0,
            last_reserved: None,
            description: None,
            avatar: None,
        }
    }

    #[test]
    fn window_inside_availability_fits() {
        let r = resource(540, 1020); // 09:00–17:00
        assert!(fits_window(&r, &Window::new(600, 660)));
        assert!(fits_window(&r, &Window::new(540, 1020))); // exact fit
    }

    #[test]
    fn window_starting_before_open_rejected() {
        let r = resource(540, 1020);
        assert!(!fits_window(&r, &Window::new(480, 540))); // 08:00–09:00
        // The numeric comparison gets single-digit hours right where a
        // lexicographic one would not: "9:00" < "10:00" as strings.
        let early = resource(540, 1020);
        assert!(!fits_window(&early, &Window::new(60, 120))); // 1:00–2:00
    }

    #[test]
    fn window_ending_after_close_rejected() {
        let r = resource(540, 1020);
        assert!(!fits_window(&r, &Window::new(1000, 1021)));
    }
}
