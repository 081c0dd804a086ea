//! reserva — temporal conflict-resolution and capacity-enforcement engine
//! for bookable resources.
//!
//! Owners publish resources (rooms, equipment, slots) with a capacity and a
//! daily availability window; users reserve time slots on them. The engine
//! admits a reservation only if it starts in the future, fits the resource's
//! availability window, leaves the resource under capacity, and does not
//! overlap any other reservation held by the same user. The same overlap and
//! capacity primitives drive availability search, and a periodic scanner
//! notifies owners when their reservations start.
//!
//! Persistence and notification delivery live behind the [`store::Store`]
//! and [`notify::Notifier`] traits; in-memory reference implementations are
//! included. HTTP routing, rendering, and authentication are the embedding
//! application's business.

pub mod clock;
pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod reminder;
pub mod store;
pub mod time;
