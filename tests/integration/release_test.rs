//! Release is the inverse of allocation.

use dormhub_core::error::ErrorKind;
use dormhub_core::types::{Gender, RegistrantId};

use crate::helpers::{TestApp, registration, room, tags};

#[tokio::test]
async fn test_allocate_then_release_restores_inventory() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![
            room("F1", Gender::Female, 3, &[]),
            room("M1", Gender::Male, 2, &[]),
        ])
        .await
        .expect("rooms");
    app.inventory
        .import_tags(tags(&["1", "2", "3"]))
        .await
        .expect("tags");
    let earlier = app
        .registration
        .register(&registration("Earlier", Gender::Female))
        .await
        .expect("earlier");

    let rooms_before = app.inventory.list_rooms().await.expect("rooms");
    let tags_before = app.inventory.list_tags().await.expect("tags");

    let allocation = app
        .registration
        .register(&registration("Transient", Gender::Female))
        .await
        .expect("register");
    assert!(!allocation.pending_room);
    assert!(!allocation.pending_tag);
    app.registration
        .release(allocation.registrant.id)
        .await
        .expect("release");

    let rooms_after = app.inventory.list_rooms().await.expect("rooms");
    let tags_after = app.inventory.list_tags().await.expect("tags");
    let beds = |rooms: &[dormhub_entity::room::Room]| {
        rooms
            .iter()
            .map(|r| (r.room_number.clone(), r.available_beds))
            .collect::<Vec<_>>()
    };
    let held = |tags: &[dormhub_entity::tag::Tag]| {
        tags.iter()
            .map(|t| (t.tag_number.clone(), t.is_assigned))
            .collect::<Vec<_>>()
    };
    assert_eq!(beds(&rooms_after), beds(&rooms_before));
    assert_eq!(held(&tags_after), held(&tags_before));

    let survivor = app.registration.get(earlier.registrant.id).await.expect("get");
    assert_eq!(survivor.tag_number.as_deref(), Some("1"));
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_release_pending_registrant_returns_nothing() {
    let app = TestApp::new();
    let allocation = app
        .registration
        .register(&registration("Nobody", Gender::Male))
        .await
        .expect("register");

    let report = app
        .registration
        .release(allocation.registrant.id)
        .await
        .expect("release");
    assert!(!report.room_released);
    assert!(!report.tag_released);
    assert!(app.registration.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_release_twice_is_not_found() {
    let app = TestApp::new();
    let allocation = app
        .registration
        .register(&registration("Once", Gender::Male))
        .await
        .expect("register");
    app.registration
        .release(allocation.registrant.id)
        .await
        .expect("first release");

    let err = app
        .registration
        .release(allocation.registrant.id)
        .await
        .expect_err("second release");
    assert_eq!(err.kind, ErrorKind::NotFound);

    let response = app
        .request("DELETE", &format!("/api/registrations/{}", RegistrantId::new()), None)
        .await;
    assert_eq!(response.status.as_u16(), 404);
}
