//! Availability snapshot and server-sent event stream.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, Stream, StreamExt};
use tracing::warn;

use dormhub_service::AvailabilitySnapshot;

use crate::dto::request::AvailabilityQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/availability?gender=
pub async fn snapshot(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilitySnapshot>>, ApiError> {
    let snapshot = state.availability.snapshot(query.gender).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}

/// GET /api/availability/stream?gender=
///
/// Sends the current snapshot, then a fresh one after each relevant change.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let watch = state.availability.watch(query.gender);
    let initial = state.availability.snapshot(query.gender).await?;

    let updates = stream::unfold(watch, |mut watch| async move {
        loop {
            match watch.changed().await? {
                Ok(update) => return Some((snapshot_event(&update.snapshot), watch)),
                Err(e) => warn!(gender = %watch.gender(), error = %e, "Availability refresh failed"),
            }
        }
    });

    let events = stream::once(async move { snapshot_event(&initial) }).chain(updates);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn snapshot_event(snapshot: &AvailabilitySnapshot) -> Result<Event, axum::Error> {
    Event::default().event("availability").json_data(snapshot)
}
