//! Registration service: retrying allocation, identity edits, and release.

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use dormhub_core::config::AllocationConfig;
use dormhub_core::error::AppError;
use dormhub_core::events::{EventBus, InventoryEvent};
use dormhub_core::types::RegistrantId;
use dormhub_database::store::{InventoryStore, ReleaseReport};
use dormhub_entity::registrant::{IdentityUpdate, Registrant, RegistrationRequest};

use crate::allocation::{Allocation, Allocator, RetryPolicy};

/// Entry point for registrant lifecycle operations.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    store: Arc<dyn InventoryStore>,
    allocator: Allocator,
    retry: RetryPolicy,
    events: EventBus,
}

impl RegistrationService {
    /// Create the service with the retry policy taken from `config`.
    pub fn new(store: Arc<dyn InventoryStore>, events: EventBus, config: &AllocationConfig) -> Self {
        Self::with_retry_policy(store, events, config, RetryPolicy::from_config(config))
    }

    /// Create the service with an explicit retry policy.
    pub fn with_retry_policy(
        store: Arc<dyn InventoryStore>,
        events: EventBus,
        config: &AllocationConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            allocator: Allocator::new(store.clone(), config.clone()),
            store,
            retry,
            events,
        }
    }

    /// Register a new registrant, retrying on contention.
    ///
    /// A registration that could not get a bed or tag still succeeds with
    /// the corresponding pending flag set.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<Allocation, AppError> {
        let allocation = self
            .retry
            .run("Registration", || self.allocator.allocate(request))
            .await?;

        self.events.publish(InventoryEvent::RegistrantCreated {
            registrant_id: allocation.registrant.id,
            gender: allocation.registrant.gender,
            room_assigned: !allocation.pending_room,
            room_gender: allocation.room.as_ref().map(|room| room.gender),
            tag_assigned: !allocation.pending_tag,
        });
        Ok(allocation)
    }

    /// Fetch a registrant.
    pub async fn get(&self, id: RegistrantId) -> Result<Registrant, AppError> {
        self.store
            .find_registrant(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Registrant {id} not found")))
    }

    /// All registrants, oldest first.
    pub async fn list(&self) -> Result<Vec<Registrant>, AppError> {
        self.store.list_registrants().await
    }

    /// Edit identity fields. Room, tag, and gender are not editable.
    pub async fn update_identity(
        &self,
        id: RegistrantId,
        update: &IdentityUpdate,
    ) -> Result<Registrant, AppError> {
        update
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid update: {e}")))?;
        if update.is_empty() {
            return Err(AppError::validation("Update changes no fields"));
        }
        if update
            .full_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
            || update.phone.as_deref().is_some_and(|p| p.trim().is_empty())
        {
            return Err(AppError::validation("Name and phone must not be blank"));
        }

        let updated = self
            .store
            .update_identity(id, update)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Registrant {id} not found")))?;
        info!(registrant_id = %id, "Registrant identity updated");
        Ok(updated)
    }

    /// Delete a registrant and return its bed and tag to the pool.
    pub async fn release(&self, id: RegistrantId) -> Result<ReleaseReport, AppError> {
        let report = self
            .store
            .release_registrant(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Registrant {id} not found")))?;

        info!(
            registrant_id = %id,
            room_number = report.registrant.room_number.as_deref().unwrap_or("-"),
            tag_number = report.registrant.tag_number.as_deref().unwrap_or("-"),
            room_released = report.room_released,
            tag_released = report.tag_released,
            "Registrant released"
        );
        self.events.publish(InventoryEvent::ResourcesReleased {
            registrant_id: id,
            gender: report.registrant.gender,
            room_released: report.room_released,
            room_gender: report.room_gender,
            tag_released: report.tag_released,
        });
        Ok(report)
    }
}
