//! Allocation ordering and contention over a shared store.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use dormhub_core::config::AllocationConfig;
use dormhub_core::types::Gender;
use dormhub_service::{RegistrationService, RetryPolicy};

use crate::helpers::{TestApp, registration, room, tags};

#[tokio::test]
async fn test_single_bed_never_double_allocated() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("Solo", Gender::Male, 1, &[])])
        .await
        .expect("rooms");

    let attempts = (0..8).map(|i| {
        let svc = app.registration.clone();
        async move { svc.register(&registration(&format!("R{i}"), Gender::Male)).await }
    });
    let results = join_all(attempts).await;

    let allocations: Vec<_> = results
        .into_iter()
        .map(|r| r.expect("registration succeeds or goes pending"))
        .collect();
    let placed = allocations.iter().filter(|a| !a.pending_room).count();
    assert_eq!(placed, 1);
    assert_eq!(allocations.len(), 8);

    let rooms = app.inventory.list_rooms().await.expect("rooms");
    assert_eq!(rooms[0].available_beds, 0);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_concurrent_registrations_spread_over_rooms() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![
            room("F1", Gender::Female, 2, &[]),
            room("F2", Gender::Female, 3, &[]),
        ])
        .await
        .expect("rooms");
    app.inventory
        .import_tags(tags(&["1", "2", "3", "4"]))
        .await
        .expect("tags");

    // Every racer may lose once per winner, so the budget covers all of them.
    let patient = RegistrationService::with_retry_policy(
        Arc::new(app.store.clone()),
        app.events.clone(),
        &AllocationConfig::default(),
        RetryPolicy::new(10, Duration::from_millis(1)),
    );
    let attempts = (0..6).map(|i| {
        let svc = patient.clone();
        async move { svc.register(&registration(&format!("F{i}"), Gender::Female)).await }
    });
    let allocations: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|r| r.expect("register"))
        .collect();

    assert_eq!(allocations.iter().filter(|a| !a.pending_room).count(), 5);
    assert_eq!(allocations.iter().filter(|a| !a.pending_tag).count(), 4);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_tags_handed_out_in_numeric_order() {
    let app = TestApp::new();
    app.inventory
        .import_tags(tags(&["3", "10", "2"]))
        .await
        .expect("tags");

    let mut handed_out = Vec::new();
    for name in ["A", "B", "C"] {
        let allocation = app
            .registration
            .register(&registration(name, Gender::Male))
            .await
            .expect("register");
        handed_out.push(allocation.registrant.tag_number.expect("tag"));
    }
    assert_eq!(handed_out, vec!["2", "3", "10"]);
}

#[tokio::test]
async fn test_most_occupied_room_filled_first() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![
            room("M1", Gender::Male, 4, &[]),
            room("M2", Gender::Male, 4, &[]),
        ])
        .await
        .expect("rooms");

    let first = app
        .registration
        .register(&registration("First", Gender::Male))
        .await
        .expect("first");
    let second = app
        .registration
        .register(&registration("Second", Gender::Male))
        .await
        .expect("second");

    assert_eq!(
        first.registrant.room_number,
        second.registrant.room_number,
        "a partly filled room is completed before an empty one is opened"
    );
}

#[tokio::test]
async fn test_picker_selection_is_honoured() {
    let app = TestApp::new();
    let rooms = app
        .inventory
        .import_rooms(vec![
            room("F1", Gender::Female, 2, &[]),
            room("F2", Gender::Female, 2, &[]),
        ])
        .await
        .expect("rooms");
    let tags = app
        .inventory
        .import_tags(tags(&["1", "2"]))
        .await
        .expect("tags");

    let f2 = rooms.iter().find(|r| r.room_number == "F2").expect("F2");
    let tag2 = tags.iter().find(|t| t.tag_number == "2").expect("tag 2");
    let mut request = registration("Picker", Gender::Female);
    request.selected_room_id = Some(f2.id);
    request.selected_tag_id = Some(tag2.id);

    let allocation = app.registration.register(&request).await.expect("register");
    assert_eq!(allocation.registrant.room_number.as_deref(), Some("F2"));
    assert_eq!(allocation.registrant.tag_number.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_gender_pool_respected() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("M1", Gender::Male, 2, &[])])
        .await
        .expect("rooms");

    let allocation = app
        .registration
        .register(&registration("Ada", Gender::Female))
        .await
        .expect("register");
    assert!(allocation.pending_room);

    let mut cross = registration("Bola", Gender::Female);
    cross.allow_cross_gender = true;
    let allocation = app.registration.register(&cross).await.expect("register");
    assert_eq!(allocation.registrant.room_number.as_deref(), Some("M1"));
}
