//! Sweeper and background worker against live inventory changes.

use std::time::Duration;

use tokio::sync::watch;

use dormhub_core::types::Gender;
use dormhub_service::SweepReport;
use dormhub_worker::{ChangeFeedTrigger, SweepQueue, SweepReason, SweepRunner};

use crate::helpers::{TestApp, registration, room, tags};

#[tokio::test]
async fn test_second_sweep_is_noop() {
    let app = TestApp::new();
    for name in ["P1", "P2", "P3"] {
        app.registration
            .register(&registration(name, Gender::Male))
            .await
            .expect("register");
    }
    app.inventory
        .import_rooms(vec![room("M1", Gender::Male, 2, &[])])
        .await
        .expect("rooms");
    app.inventory.import_tags(tags(&["7"])).await.expect("tags");

    let first = app.sweeper.sweep().await.expect("first");
    assert_eq!(first.rooms_assigned, 2);
    assert_eq!(first.tags_assigned, 1);

    let registrants_before = app.registration.list().await.expect("list");
    let second = app.sweeper.sweep().await.expect("second");
    assert_eq!(second, SweepReport::default());
    assert_eq!(app.registration.list().await.expect("list"), registrants_before);
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_worker_completes_pending_after_import() {
    let app = TestApp::new();
    let waiting = app
        .registration
        .register(&registration("Z", Gender::Female))
        .await
        .expect("register");
    assert!(waiting.pending_room);
    assert!(waiting.pending_tag);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (queue, requests) = SweepQueue::new();
    let trigger = ChangeFeedTrigger::new(app.events.clone(), queue).spawn(cancel_rx.clone());
    let runner = tokio::spawn(SweepRunner::new(app.sweeper.clone(), requests).run(cancel_rx));

    app.inventory
        .import_rooms(vec![room("B", Gender::Female, 1, &[])])
        .await
        .expect("rooms");
    app.inventory.import_tags(tags(&["5"])).await.expect("tags");

    let mut settled = None;
    for _ in 0..100 {
        let current = app.registration.get(waiting.registrant.id).await.expect("get");
        if !current.is_room_pending() && !current.is_tag_pending() {
            settled = Some(current);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let settled = settled.expect("worker should settle the registrant");
    assert_eq!(settled.room_number.as_deref(), Some("B"));
    assert_eq!(settled.tag_number.as_deref(), Some("5"));

    cancel_tx.send(true).expect("cancel");
    tokio::time::timeout(Duration::from_secs(1), trigger)
        .await
        .expect("trigger stops")
        .expect("trigger task");
    tokio::time::timeout(Duration::from_secs(1), runner)
        .await
        .expect("runner stops")
        .expect("runner task");
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_release_lets_sweep_reuse_bed() {
    let app = TestApp::new();
    app.inventory
        .import_rooms(vec![room("M1", Gender::Male, 1, &["001"])])
        .await
        .expect("rooms");
    let holder = app
        .registration
        .register(&registration("Holder", Gender::Male))
        .await
        .expect("holder");
    let waiting = app
        .registration
        .register(&registration("Waiting", Gender::Male))
        .await
        .expect("waiting");
    assert!(waiting.pending_room);

    app.registration
        .release(holder.registrant.id)
        .await
        .expect("release");
    let report = app.sweeper.sweep().await.expect("sweep");
    assert_eq!(report.rooms_assigned, 1);

    let waiting = app.registration.get(waiting.registrant.id).await.expect("get");
    assert_eq!(waiting.room_number.as_deref(), Some("M1"));
    assert_eq!(waiting.bed_number.as_deref(), Some("001"));
    app.assert_consistent().await;
}

#[tokio::test]
async fn test_manual_sweep_over_http() {
    let mut app = TestApp::new();
    let response = app.request("POST", "/api/reconciliation/sweep", None).await;
    assert_eq!(response.status.as_u16(), 202);
    assert_eq!(response.body["data"]["queued"], true);

    let reason = app.sweep_requests.next().await.expect("queued request");
    assert_eq!(reason, SweepReason::Manual);
}
