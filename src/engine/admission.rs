use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::MAX_CONTACT_LEN;
use crate::model::Reservation;
use crate::observability;
use crate::store::ResourceMutation;
use crate::time::{Instant, Window, parse_date, parse_minutes};

use super::availability::fits_window;
use super::conflict::{count_overlapping, user_has_conflict};
use super::{Engine, EngineError};

/// An inbound reservation request, fields as collected from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub resource_id: Ulid,
    pub user_id: String,
    /// Contact address for the reservation-started notification.
    pub user_contact: String,
    /// "YYYY-MM-DD"
    pub date: String,
    /// "HH:MM"
    pub start: String,
    /// "HH:MM"
    pub duration: String,
}

/// Admission decision. The rejections are expected business outcomes, not
/// errors; only `Accepted` has side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Accepted(Reservation),
    /// The requested start instant is at or before the current minute.
    PastRejected,
    /// The window falls outside the resource's published daily availability.
    UnavailableRejected,
    /// The resource already hosts capacity-many overlapping reservations.
    CapacityRejected,
    /// The user already holds an overlapping reservation somewhere.
    UserConflictRejected,
}

impl ScheduleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScheduleOutcome::Accepted(_))
    }

    /// Short label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleOutcome::Accepted(_) => "accepted",
            ScheduleOutcome::PastRejected => "past",
            ScheduleOutcome::UnavailableRejected => "unavailable",
            ScheduleOutcome::CapacityRejected => "capacity",
            ScheduleOutcome::UserConflictRejected => "user_conflict",
        }
    }
}

impl Engine {
    /// Admit or reject a reservation request. First failing check wins:
    ///
    /// 1. unknown resource → `NotFound`; unparsable input → `MalformedTime`
    /// 2. requested start at or before now → `PastRejected`
    /// 3. window outside the availability window → `UnavailableRejected`
    /// 4. overlap count equals capacity → `CapacityRejected`
    /// 5. user overlap on any resource → `UserConflictRejected`
    /// 6. otherwise create the reservation and bump the resource counters
    ///    as one atomic store write
    ///
    /// Steps 4–6 run under the resource's admission lock, so concurrent
    /// requests for the same resource are serialized and capacity can never
    /// be oversubscribed by a read-then-write race.
    pub async fn schedule_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<ScheduleOutcome, EngineError> {
        let started = std::time::Instant::now();
        let outcome = self.admit(request).await;
        metrics::histogram!(observability::ADMISSION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        if let Ok(ref o) = outcome {
            metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => o.label())
                .increment(1);
        }
        outcome
    }

    async fn admit(&self, request: ReservationRequest) -> Result<ScheduleOutcome, EngineError> {
        if request.user_contact.len() > MAX_CONTACT_LEN {
            return Err(EngineError::LimitExceeded("contact address too long"));
        }

        // Existence first: an unknown resource is NotFound regardless of
        // how the request is timed.
        let resource = self.store.fetch_resource(request.resource_id).await?;

        let date = parse_date(&request.date)?;
        let start = parse_minutes(&request.start)?;
        let duration = parse_minutes(&request.duration)?;

        // A request for exactly the current minute counts as passed.
        let now = self.clock.now();
        if Instant::new(date, start) <= now {
            debug!(resource = %resource.id, %date, start = request.start, "rejected: start elapsed");
            return Ok(ScheduleOutcome::PastRejected);
        }

        let window = Window::from_start_duration(start, duration);
        if !fits_window(&resource, &window) {
            debug!(resource = %resource.id, %window, "rejected: outside availability window");
            return Ok(ScheduleOutcome::UnavailableRejected);
        }

        // Guards and creation are serialized per resource.
        let lock = self.admission_lock(resource.id);
        let _guard = lock.lock().await;

        // Re-read under the lock: the counter update must be based on
        // serialized state, not the pre-lock snapshot.
        let resource = self.store.fetch_resource(request.resource_id).await?;

        let existing = self.store.list_reservations_by_resource(resource.id).await?;
        if count_overlapping(&existing, date, &window, now) == resource.capacity as usize {
            debug!(resource = %resource.id, %window, capacity = resource.capacity,
                "rejected: capacity reached");
            return Ok(ScheduleOutcome::CapacityRejected);
        }

        let user_reservations = self.store.list_reservations_by_user(&request.user_id).await?;
        if user_has_conflict(&user_reservations, date, &window, now) {
            debug!(user = request.user_id, %window, "rejected: user double-booking");
            return Ok(ScheduleOutcome::UserConflictRejected);
        }

        let reservation = Reservation {
            id: Ulid::new(),
            resource_id: resource.id,
            date,
            window,
            duration: window.duration(),
            owner_id: request.user_id,
            owner_contact: request.user_contact,
            resource_name: resource.name.clone(),
        };
        let mutation = ResourceMutation {
            resource_id: resource.id,
            times_reserved: resource.times_reserved + 1,
            last_reserved: self.clock.now_datetime(),
        };
        self.store
            .create_reservation_and_update_resource(reservation.clone(), mutation)
            .await?;

        info!(reservation = %reservation.id, resource = %resource.id, %date, %window, "reservation accepted");
        Ok(ScheduleOutcome::Accepted(reservation))
    }

    /// Cancel a reservation by id. No effect on the resource's counters.
    pub async fn cancel_reservation(&self, id: Ulid) -> Result<(), EngineError> {
        self.store.delete_reservation(id).await?;
        info!(reservation = %id, "reservation cancelled");
        Ok(())
    }
}
