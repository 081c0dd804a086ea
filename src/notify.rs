use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Reservation;

const CHANNEL_CAPACITY: usize = 256;

/// Delivery failure from the notification collaborator. The reminder scanner
/// logs these and moves on; nothing else in the engine ever swallows errors.
#[derive(Debug, Clone)]
pub struct NotifyError(pub String);

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "notification failed: {}", self.0)
    }
}

impl std::error::Error for NotifyError {}

/// Notification collaborator. The transport (mail, webhook, queue) lives
/// behind this trait and may fail independently of the engine.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_reservation_started(&self, reservation: &Reservation)
    -> Result<(), NotifyError>;
}

/// Broadcast hub keyed by resource: embedders subscribe per resource and
/// receive the reservations whose start minute has arrived.
pub struct BroadcastNotifier {
    channels: DashMap<Ulid, broadcast::Sender<Reservation>>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to started-reservation events for a resource. Creates the
    /// channel if needed.
    pub fn subscribe(&self, resource_id: Ulid) -> broadcast::Receiver<Reservation> {
        let sender = self
            .channels
            .entry(resource_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Remove a channel (e.g. when a resource leaves the catalog).
    pub fn remove(&self, resource_id: &Ulid) {
        self.channels.remove(resource_id);
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    /// No-op if nobody is listening for the resource.
    async fn notify_reservation_started(
        &self,
        reservation: &Reservation,
    ) -> Result<(), NotifyError> {
        if let Some(sender) = self.channels.get(&reservation.resource_id) {
            let _ = sender.send(reservation.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Window;
    use chrono::NaiveDate;

    fn reservation(resource_id: Ulid) -> Reservation {
        Reservation {
            id: Ulid::new(),
            resource_id,
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            window: Window::new(600, 660),
            duration: 60,
            owner_id: "u1".into(),
            owner_contact: "u1@example.com".into(),
            resource_name: "Room A".into(),
        }
    }

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = BroadcastNotifier::new();
        let rid = Ulid::new();
        let mut rx = hub.subscribe(rid);

        let r = reservation(rid);
        hub.notify_reservation_started(&r).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, r);
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_noop() {
        let hub = BroadcastNotifier::new();
        let r = reservation(Ulid::new());
        hub.notify_reservation_started(&r).await.unwrap();
    }

    #[tokio::test]
    async fn subscribers_are_per_resource() {
        let hub = BroadcastNotifier::new();
        let mine = Ulid::new();
        let other = Ulid::new();
        let mut rx = hub.subscribe(mine);
        let _other_rx = hub.subscribe(other);

        hub.notify_reservation_started(&reservation(other))
            .await
            .unwrap();
        assert!(rx.try_recv().is_err());

        hub.notify_reservation_started(&reservation(mine))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().resource_id, mine);
    }
}
