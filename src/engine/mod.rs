mod admission;
mod availability;
mod conflict;
mod error;
mod queries;

pub use admission::{ReservationRequest, ScheduleOutcome};
pub use availability::{AvailabilityQuery, fits_window};
pub use conflict::{collect_upcoming, count_overlapping, user_has_conflict};
pub use error::EngineError;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use ulid::Ulid;

use crate::clock::Clock;
use crate::notify::Notifier;
use crate::store::Store;

/// The temporal conflict-resolution and capacity-enforcement engine.
///
/// Reads and writes go through the persistence collaborator; reminder
/// notifications go through the notification collaborator; every time
/// decision routes through the injected clock.
pub struct Engine {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) clock: Clock,
    /// One admission lock per resource, held across the guard-then-create
    /// sequence so two concurrent requests can never both take a resource's
    /// last slot. Searches and queries never touch these.
    admission_locks: DashMap<Ulid, Arc<Mutex<()>>>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, clock: Clock) -> Self {
        Self {
            store,
            notifier,
            clock,
            admission_locks: DashMap::new(),
        }
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub(crate) fn admission_lock(&self, resource_id: Ulid) -> Arc<Mutex<()>> {
        // The DashMap guard drops at the end of this expression; only the
        // Arc escapes, so the lock is never awaited while a shard is held.
        self.admission_locks.entry(resource_id).or_default().clone()
    }
}
