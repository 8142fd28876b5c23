//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use dormhub_core::config::AppConfig;
use dormhub_core::events::EventBus;
use dormhub_core::types::Gender;
use dormhub_database::MemoryInventoryStore;
use dormhub_database::store::InventoryStore;
use dormhub_entity::registrant::RegistrationRequest;
use dormhub_entity::room::NewRoom;
use dormhub_entity::tag::NewTag;
use dormhub_service::{InventoryService, RegistrationService, Sweeper};
use dormhub_worker::{SweepQueue, SweepRequests};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemoryInventoryStore,
    /// Shared event bus
    pub events: EventBus,
    /// Registration service wired to the same store
    pub registration: RegistrationService,
    /// Inventory service wired to the same store
    pub inventory: InventoryService,
    /// Sweeper wired to the same store
    pub sweeper: Sweeper,
    /// Receiving end of the sweep queue; kept so manual sweeps are accepted
    pub sweep_requests: SweepRequests,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = MemoryInventoryStore::new();
        let shared: Arc<dyn InventoryStore> = Arc::new(store.clone());
        let events = EventBus::default();
        let (sweeps, sweep_requests) = SweepQueue::new();

        let registration =
            RegistrationService::new(Arc::clone(&shared), events.clone(), &config.allocation);
        let inventory = InventoryService::new(Arc::clone(&shared), events.clone());
        let sweeper = Sweeper::new(
            Arc::clone(&shared),
            events.clone(),
            config.allocation.vip_label_prefix.clone(),
        );

        let state = dormhub_api::AppState::new(Arc::new(config), shared, events.clone(), sweeps);
        let router = dormhub_api::build_router(state);

        Self {
            router,
            store,
            events,
            registration,
            inventory,
            sweeper,
            sweep_requests,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Check the counter and holder invariants across the whole store
    pub async fn assert_consistent(&self) {
        assert_store_consistent(&self.store).await;
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Registration with no picker selection
pub fn registration(name: &str, gender: Gender) -> RegistrationRequest {
    RegistrationRequest {
        full_name: name.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2001, 6, 15),
        gender: Some(gender),
        phone: "08030000000".to_string(),
        ..Default::default()
    }
}

/// Room import row
pub fn room(number: &str, gender: Gender, beds: i32, labels: &[&str]) -> NewRoom {
    NewRoom {
        wing: "Main".to_string(),
        room_number: number.to_string(),
        gender,
        total_beds: beds,
        bed_numbers: if labels.is_empty() {
            None
        } else {
            Some(labels.iter().map(|l| l.to_string()).collect())
        },
        is_vip_room: false,
    }
}

/// Tag import rows
pub fn tags(numbers: &[&str]) -> Vec<NewTag> {
    numbers
        .iter()
        .map(|n| NewTag {
            tag_number: n.to_string(),
        })
        .collect()
}

/// Bed counters stay in range, occupancy matches holders, and every
/// assigned tag has exactly one holder.
pub async fn assert_store_consistent(store: &dyn InventoryStore) {
    let rooms = store.list_rooms().await.expect("rooms");
    let tags = store.list_tags().await.expect("tags");
    let registrants = store.list_registrants().await.expect("registrants");

    for room in &rooms {
        assert!(
            room.counters_consistent(),
            "room {} has {} of {} beds free",
            room.room_number,
            room.available_beds,
            room.total_beds
        );
        let holders = registrants
            .iter()
            .filter(|r| r.room_number.as_deref() == Some(room.room_number.as_str()))
            .count() as i32;
        assert_eq!(
            room.occupancy(),
            holders,
            "room {} occupancy does not match its registrants",
            room.room_number
        );
    }

    for tag in &tags {
        let holders = registrants
            .iter()
            .filter(|r| r.tag_number.as_deref() == Some(tag.tag_number.as_str()))
            .count();
        assert_eq!(
            holders,
            usize::from(tag.is_assigned),
            "tag {} assignment does not match its holders",
            tag.tag_number
        );
    }
}
