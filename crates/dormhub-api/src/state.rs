//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use dormhub_core::config::AppConfig;
use dormhub_core::events::EventBus;
use dormhub_database::store::InventoryStore;
use dormhub_service::{AvailabilityService, InventoryService, RegistrationService};
use dormhub_worker::SweepQueue;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Inventory store, for health checks.
    pub store: Arc<dyn InventoryStore>,
    /// Registration, edit, and release.
    pub registration: RegistrationService,
    /// Room and tag import.
    pub inventory: InventoryService,
    /// Availability snapshots and feeds.
    pub availability: AvailabilityService,
    /// Sweep request queue.
    pub sweeps: SweepQueue,
    /// When the server started.
    pub started_at: Instant,
}

impl AppState {
    /// Build the services over `store` and `events`.
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn InventoryStore>,
        events: EventBus,
        sweeps: SweepQueue,
    ) -> Self {
        Self {
            registration: RegistrationService::new(
                store.clone(),
                events.clone(),
                &config.allocation,
            ),
            inventory: InventoryService::new(store.clone(), events.clone()),
            availability: AvailabilityService::new(store.clone(), events),
            store,
            sweeps,
            config,
            started_at: Instant::now(),
        }
    }
}
