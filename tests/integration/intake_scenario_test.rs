//! End-to-end intake: fill a room, queue the overflow, complete it from new
//! inventory, and release.

use dormhub_core::types::Gender;
use dormhub_entity::registrant::AssignmentStatus;

use crate::helpers::{TestApp, registration, room, tags};

#[tokio::test]
async fn test_room_fills_in_label_order_then_overflow_waits() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("A", Gender::Female, 2, &["001", "002"])])
        .await
        .expect("import");

    let x = app
        .registration
        .register(&registration("X", Gender::Female))
        .await
        .expect("X");
    assert_eq!(x.registrant.room_number.as_deref(), Some("A"));
    assert_eq!(x.registrant.bed_number.as_deref(), Some("001"));
    assert_eq!(x.room.as_ref().map(|r| r.available_beds), Some(1));

    let y = app
        .registration
        .register(&registration("Y", Gender::Female))
        .await
        .expect("Y");
    assert_eq!(y.registrant.bed_number.as_deref(), Some("002"));
    assert_eq!(y.room.as_ref().map(|r| r.available_beds), Some(0));

    let z = app
        .registration
        .register(&registration("Z", Gender::Female))
        .await
        .expect("Z");
    assert!(z.pending_room);
    assert_eq!(z.registrant.room_status, AssignmentStatus::Pending);
    assert!(z.registrant.room_number.is_none());

    app.assert_consistent().await;
}

#[tokio::test]
async fn test_new_room_completes_pending_registrant() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("A", Gender::Female, 2, &["001", "002"])])
        .await
        .expect("import A");
    for name in ["X", "Y"] {
        app.registration
            .register(&registration(name, Gender::Female))
            .await
            .expect("register");
    }
    let z = app
        .registration
        .register(&registration("Z", Gender::Female))
        .await
        .expect("Z");
    assert!(z.pending_room);

    app.inventory
        .import_rooms(vec![room("B", Gender::Female, 1, &[])])
        .await
        .expect("import B");
    let report = app.sweeper.sweep().await.expect("sweep");
    assert_eq!(report.rooms_assigned, 1);

    let z = app.registration.get(z.registrant.id).await.expect("Z");
    assert_eq!(z.room_status, AssignmentStatus::Assigned);
    assert_eq!(z.room_number.as_deref(), Some("B"));
    assert_eq!(z.bed_number.as_deref(), Some("001"));

    let rooms = app.inventory.list_rooms().await.expect("rooms");
    assert!(rooms.iter().all(|r| r.available_beds == 0));
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_deleting_holder_frees_bed_and_tag() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("A", Gender::Male, 2, &["001", "002"])])
        .await
        .expect("rooms");
    app.inventory.import_tags(tags(&["1"])).await.expect("tags");

    let x = app
        .registration
        .register(&registration("X", Gender::Male))
        .await
        .expect("X");
    assert_eq!(x.registrant.tag_number.as_deref(), Some("1"));

    let report = app.registration.release(x.registrant.id).await.expect("release");
    assert!(report.room_released);
    assert!(report.tag_released);

    let rooms = app.inventory.list_rooms().await.expect("rooms");
    assert_eq!(rooms[0].available_beds, 2);
    let tags = app.inventory.list_tags().await.expect("tags");
    assert!(!tags[0].is_assigned);
    assert!(tags[0].assigned_user_id.is_none());
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_intake_over_http() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/rooms/import",
            Some(serde_json::json!({"rooms": [{
                "wing": "Main", "room_number": "A", "gender": "male",
                "total_beds": 1, "bed_numbers": ["001"]
            }]})),
        )
        .await;
    assert_eq!(response.status.as_u16(), 201);
    assert_eq!(response.body["data"]["imported"], 1);

    let body = serde_json::json!({
        "full_name": "Tunde Bello",
        "date_of_birth": "1999-01-20",
        "gender": "male",
        "phone": "0701",
    });
    let first = app.request("POST", "/api/registrations", Some(body.clone())).await;
    assert_eq!(first.body["data"]["room_assignment"]["room_number"], "A");
    assert_eq!(first.body["data"]["pending_tag"], true);

    let second = app.request("POST", "/api/registrations", Some(body)).await;
    assert_eq!(second.status.as_u16(), 201);
    assert_eq!(second.body["data"]["pending_room"], true);
    assert_eq!(
        second.body["data"]["message"],
        "Room and tag will be assigned later"
    );

    let listing = app.request("GET", "/api/registrations", None).await;
    assert_eq!(listing.body["data"].as_array().map(Vec::len), Some(2));
}
