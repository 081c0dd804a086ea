use tracing::info;
use ulid::Ulid;

use crate::limits::*;
use crate::model::{Reservation, Resource, ResourceSpec, TagSet};
use crate::time::{Minutes, parse_minutes};

use super::conflict::collect_upcoming;
use super::{Engine, EngineError};

fn validate_spec(spec: &ResourceSpec) -> Result<(Minutes, Minutes, TagSet), EngineError> {
    if spec.name.trim().is_empty() {
        return Err(EngineError::InvalidResource("name must not be empty"));
    }
    if spec.name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("resource name too long"));
    }
    if let Some(ref d) = spec.description
        && d.len() > MAX_DESCRIPTION_LEN {
            return Err(EngineError::LimitExceeded("description too long"));
        }
    if spec.capacity < 1 {
        return Err(EngineError::InvalidResource("capacity must be at least 1"));
    }

    let open = parse_minutes(&spec.open)?;
    let close = parse_minutes(&spec.close)?;
    if open >= close {
        return Err(EngineError::InvalidResource(
            "availability start must be before availability end",
        ));
    }

    let tags = TagSet::parse(&spec.tags);
    if tags.len() > MAX_TAGS {
        return Err(EngineError::LimitExceeded("too many tags"));
    }
    if tags.iter().any(|t| t.len() > MAX_TAG_LEN) {
        return Err(EngineError::LimitExceeded("tag too long"));
    }

    Ok((open, close, tags))
}

fn trimmed_description(spec: &ResourceSpec) -> Option<String> {
    spec.description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

impl Engine {
    /// Publish a new resource to the catalog.
    pub async fn create_resource(&self, spec: ResourceSpec) -> Result<Resource, EngineError> {
        let (open, close, tags) = validate_spec(&spec)?;
        let resource = Resource {
            id: Ulid::new(),
            name: spec.name.trim().to_string(),
            owner_id: spec.owner_id.clone(),
            open_minute: open,
            close_minute: close,
            capacity: spec.capacity,
            tags,
            times_reserved: 0,
            last_reserved: None,
            description: trimmed_description(&spec),
            avatar: spec.avatar,
        };
        self.store.insert_resource(resource.clone()).await?;
        info!(resource = %resource.id, name = resource.name, "resource created");
        Ok(resource)
    }

    /// Replace the owner-editable fields of an existing resource. Counters
    /// and the last-reservation timestamp are preserved; existing
    /// reservations are not re-validated against the new window.
    pub async fn update_resource(
        &self,
        id: Ulid,
        spec: ResourceSpec,
    ) -> Result<Resource, EngineError> {
        let (open, close, tags) = validate_spec(&spec)?;
        let existing = self.store.fetch_resource(id).await?;
        let updated = Resource {
            id,
            name: spec.name.trim().to_string(),
            owner_id: existing.owner_id,
            open_minute: open,
            close_minute: close,
            capacity: spec.capacity,
            tags,
            times_reserved: existing.times_reserved,
            last_reserved: existing.last_reserved,
            description: trimmed_description(&spec),
            avatar: spec.avatar.or(existing.avatar),
        };
        self.store.update_resource(updated.clone()).await?;
        info!(resource = %id, "resource edited");
        Ok(updated)
    }

    pub async fn fetch_resource(&self, id: Ulid) -> Result<Resource, EngineError> {
        Ok(self.store.fetch_resource(id).await?)
    }

    /// Whole catalog, most recently reserved first.
    pub async fn list_resources(&self) -> Result<Vec<Resource>, EngineError> {
        Ok(self.store.list_all_resources().await?)
    }

    pub async fn resources_by_owner(&self, owner_id: &str) -> Result<Vec<Resource>, EngineError> {
        Ok(self.store.list_resources_by_owner(owner_id).await?)
    }

    /// Resources carrying the exact tag.
    pub async fn resources_by_tag(&self, tag: &str) -> Result<Vec<Resource>, EngineError> {
        let tag = tag.trim();
        Ok(self
            .store
            .list_all_resources()
            .await?
            .into_iter()
            .filter(|r| r.tags.contains(tag))
            .collect())
    }

    /// Resources with the exact (case-sensitive) name.
    pub async fn resources_by_name(&self, name: &str) -> Result<Vec<Resource>, EngineError> {
        let name = name.trim();
        Ok(self
            .store
            .list_all_resources()
            .await?
            .into_iter()
            .filter(|r| r.name == name)
            .collect())
    }

    /// Still-upcoming reservations for a resource, date then start order.
    pub async fn upcoming_reservations_for_resource(
        &self,
        resource_id: Ulid,
    ) -> Result<Vec<Reservation>, EngineError> {
        let all = self.store.list_reservations_by_resource(resource_id).await?;
        Ok(collect_upcoming(all, self.clock.now()))
    }

    /// Still-upcoming reservations held by a user across all resources.
    pub async fn upcoming_reservations_for_user(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Reservation>, EngineError> {
        let all = self.store.list_reservations_by_user(owner_id).await?;
        Ok(collect_upcoming(all, self.clock.now()))
    }
}
