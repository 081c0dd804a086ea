use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::{Reservation, Resource};

/// Storage-layer fault. Business rejections never surface here.
#[derive(Debug)]
pub enum StoreError {
    NotFound(Ulid),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The scheduler's write-back to a resource on every accepted reservation.
/// Absolute values, computed under the admission lock.
#[derive(Debug, Clone, Copy)]
pub struct ResourceMutation {
    pub resource_id: Ulid,
    pub times_reserved: u64,
    pub last_reserved: NaiveDateTime,
}

/// Persistence collaborator. Implementation-agnostic: the engine only relies
/// on the ordering contracts documented per method and on
/// [`Store::create_reservation_and_update_resource`] being one atomic unit.
#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_resource(&self, id: Ulid) -> Result<Resource, StoreError>;

    async fn insert_resource(&self, resource: Resource) -> Result<(), StoreError>;

    /// Replace a resource record wholesale (owner edits).
    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError>;

    /// Ordered by last-reservation time, descending (never-reserved last).
    async fn list_all_resources(&self) -> Result<Vec<Resource>, StoreError>;

    /// Same order as [`Store::list_all_resources`], filtered to one owner.
    async fn list_resources_by_owner(&self, owner_id: &str) -> Result<Vec<Resource>, StoreError>;

    /// Ordered by date then start time, ascending.
    async fn list_reservations_by_resource(
        &self,
        resource_id: Ulid,
    ) -> Result<Vec<Reservation>, StoreError>;

    /// Ordered by date then start time, ascending. Spans all resources.
    async fn list_reservations_by_user(&self, owner_id: &str)
    -> Result<Vec<Reservation>, StoreError>;

    /// Every reservation in the store, for the reminder scan.
    async fn list_all_reservations(&self) -> Result<Vec<Reservation>, StoreError>;

    /// Persist a new reservation and the resource counter update as one
    /// atomic unit. Fails with `NotFound` if the resource is gone.
    async fn create_reservation_and_update_resource(
        &self,
        reservation: Reservation,
        mutation: ResourceMutation,
    ) -> Result<(), StoreError>;

    async fn delete_reservation(&self, id: Ulid) -> Result<(), StoreError>;
}

/// In-memory reference store. Admissions are serialized per resource by the
/// engine, so the two-map write in
/// [`MemoryStore::create_reservation_and_update_resource`] is performed
/// while holding the resource's shard entry.
#[derive(Default)]
pub struct MemoryStore {
    resources: DashMap<Ulid, Resource>,
    reservations: DashMap<Ulid, Reservation>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_resources(mut resources: Vec<Resource>) -> Vec<Resource> {
    resources.sort_by_key(|r| (Reverse(r.last_reserved), r.id));
    resources
}

fn sort_reservations(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| (r.date, r.window.start, r.id));
    reservations
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_resource(&self, id: Ulid) -> Result<Resource, StoreError> {
        self.resources
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn insert_resource(&self, resource: Resource) -> Result<(), StoreError> {
        self.resources.insert(resource.id, resource);
        Ok(())
    }

    async fn update_resource(&self, resource: Resource) -> Result<(), StoreError> {
        if !self.resources.contains_key(&resource.id) {
            return Err(StoreError::NotFound(resource.id));
        }
        self.resources.insert(resource.id, resource);
        Ok(())
    }

    async fn list_all_resources(&self) -> Result<Vec<Resource>, StoreError> {
        Ok(sort_resources(
            self.resources.iter().map(|e| e.value().clone()).collect(),
        ))
    }

    async fn list_resources_by_owner(&self, owner_id: &str) -> Result<Vec<Resource>, StoreError> {
        Ok(sort_resources(
            self.resources
                .iter()
                .filter(|e| e.value().owner_id == owner_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn list_reservations_by_resource(
        &self,
        resource_id: Ulid,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(sort_reservations(
            self.reservations
                .iter()
                .filter(|e| e.value().resource_id == resource_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn list_reservations_by_user(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(sort_reservations(
            self.reservations
                .iter()
                .filter(|e| e.value().owner_id == owner_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn list_all_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(sort_reservations(
            self.reservations.iter().map(|e| e.value().clone()).collect(),
        ))
    }

    async fn create_reservation_and_update_resource(
        &self,
        reservation: Reservation,
        mutation: ResourceMutation,
    ) -> Result<(), StoreError> {
        let mut entry = self
            .resources
            .get_mut(&mutation.resource_id)
            .ok_or(StoreError::NotFound(mutation.resource_id))?;
        self.reservations.insert(reservation.id, reservation);
        entry.times_reserved = mutation.times_reserved;
        entry.last_reserved = Some(mutation.last_reserved);
        Ok(())
    }

    async fn delete_reservation(&self, id: Ulid) -> Result<(), StoreError> {
        self.reservations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
