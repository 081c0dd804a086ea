//! End-to-end booking flow over the public API: publish a resource, admit
//! and reject reservations, search availability, receive the start
//! notification, cancel.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use reserva::clock::Clock;
use reserva::engine::{AvailabilityQuery, Engine, ReservationRequest, ScheduleOutcome};
use reserva::model::ResourceSpec;
use reserva::notify::BroadcastNotifier;
use reserva::store::MemoryStore;

fn fixed(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn booking(
    resource_id: ulid::Ulid,
    user: &str,
    date: &str,
    start: &str,
    duration: &str,
) -> ReservationRequest {
    ReservationRequest {
        resource_id,
        user_id: user.into(),
        user_contact: format!("{user}@example.com"),
        date: date.into(),
        start: start.into(),
        duration: duration.into(),
    }
}

fn candidate(date: &str, start: &str, duration: &str) -> AvailabilityQuery {
    AvailabilityQuery {
        date: date.into(),
        start: start.into(),
        duration: duration.into(),
    }
}

#[tokio::test]
async fn full_booking_flow() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let store = Arc::new(MemoryStore::new());
    let hub = Arc::new(BroadcastNotifier::new());
    // Frozen at 10:00 on the day of the bookings.
    let engine = Engine::new(
        store.clone(),
        hub.clone(),
        Clock::fixed(fixed(2024, 6, 10, 10, 0)),
    );

    let room = engine
        .create_resource(ResourceSpec {
            name: "Conference room".into(),
            owner_id: "facilities".into(),
            open: "09:00".into(),
            close: "18:00".into(),
            capacity: 1,
            tags: "projector,large".into(),
            description: Some("Fourth floor".into()),
            avatar: None,
        })
        .await
        .unwrap();
    let mut events = hub.subscribe(room.id);

    // The afternoon slot is free and gets admitted.
    let ScheduleOutcome::Accepted(reservation) = engine
        .schedule_reservation(booking(room.id, "alice", "2024-06-10", "14:00", "1:30"))
        .await
        .unwrap()
    else {
        panic!("expected acceptance");
    };
    assert_eq!(reservation.resource_name, "Conference room");

    // An overlapping attempt by someone else bounces off the capacity.
    let clash = engine
        .schedule_reservation(booking(room.id, "bob", "2024-06-10", "14:30", "1:00"))
        .await
        .unwrap();
    assert_eq!(clash, ScheduleOutcome::CapacityRejected);

    // Search agrees: the taken window yields nothing, the evening is open.
    assert!(engine
        .search_availability(candidate("2024-06-10", "14:30", "1:00"))
        .await
        .unwrap()
        .is_empty());
    let evening = engine
        .search_availability(candidate("2024-06-10", "16:00", "1:00"))
        .await
        .unwrap();
    assert_eq!(evening.len(), 1);
    assert_eq!(evening[0].id, room.id);

    // Alice sees her booking in the upcoming list.
    let upcoming = engine.upcoming_reservations_for_user("alice").await.unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, reservation.id);

    // Nothing starts at 10:00, so a scan now delivers nothing.
    assert_eq!(engine.run_reminder_scan().await.unwrap(), 0);

    // At 14:00 a scan pushes the started reservation to the subscriber.
    // A second engine over the same store stands in for the clock advancing.
    let later = Engine::new(
        store.clone(),
        hub.clone(),
        Clock::fixed(fixed(2024, 6, 10, 14, 0)),
    );
    assert_eq!(later.run_reminder_scan().await.unwrap(), 1);
    let started = events.recv().await.unwrap();
    assert_eq!(started.id, reservation.id);

    // Cancelling frees the slot for the request that bounced earlier.
    engine.cancel_reservation(reservation.id).await.unwrap();
    let retry = engine
        .schedule_reservation(booking(room.id, "bob", "2024-06-10", "14:30", "1:00"))
        .await
        .unwrap();
    assert!(retry.is_accepted());
}
