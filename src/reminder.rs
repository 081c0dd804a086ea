use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::{Engine, EngineError, collect_upcoming};
use crate::observability;

impl Engine {
    /// One reminder pass: notify the owner of every upcoming reservation
    /// whose start instant equals the current minute, exactly once each.
    ///
    /// This is the one place errors are intentionally suppressed: a delivery
    /// failure is logged and counted, and the scan continues with the
    /// remaining reservations. Returns the number delivered.
    pub async fn run_reminder_scan(&self) -> Result<usize, EngineError> {
        let now = self.clock.now();
        let upcoming = collect_upcoming(self.store.list_all_reservations().await?, now);

        let mut delivered = 0usize;
        for reservation in upcoming {
            if reservation.start_instant() != now {
                continue;
            }
            match self.notifier.notify_reservation_started(&reservation).await {
                Ok(()) => {
                    delivered += 1;
                    metrics::counter!(observability::REMINDERS_SENT_TOTAL).increment(1);
                    info!(reservation = %reservation.id, contact = reservation.owner_contact,
                        "reservation-started notification sent");
                }
                Err(e) => {
                    metrics::counter!(observability::REMINDER_FAILURES_TOTAL).increment(1);
                    warn!(reservation = %reservation.id, error = %e,
                        "reservation-started notification failed");
                }
            }
        }
        Ok(delivered)
    }
}

/// Background task driving the reminder scan once per period (typically one
/// minute). Runs independently of admissions and never blocks them.
pub async fn run_reminder_scanner(engine: Arc<Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        if let Err(e) = engine.run_reminder_scan().await {
            // Store faults are not swallowed silently, but the scanner
            // itself keeps running; the next tick retries.
            warn!(error = %e, "reminder scan failed");
        }
    }
}
